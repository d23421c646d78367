use i915_rs::{ContextCreateFlags, EngineClass, GemDevice, GemResult};
use std::env;
use std::fs::OpenOptions;
use std::os::fd::AsFd;

fn main() -> GemResult<()> {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/dri/renderD128".to_string());

    println!("--- i915 GEM Info: {path} ---");
    let file = OpenOptions::new().read(true).write(true).open(&path)?;
    let dev = GemDevice::new(file.as_fd());

    // 1. Engines
    let info = dev.query_engine_info()?;
    println!("\n--- Engines ({}) ---", info.engines.len());
    for engine in &info.engines {
        println!(
            "  - {:<12} instance {} (logical {:?})",
            format!("{:?}", engine.class),
            engine.instance,
            engine.logical_instance
        );
    }

    // 2. Capabilities
    println!("\n--- Capabilities ---");
    println!("  syncobj wait:       {}", dev.supports_syncobj_wait());
    println!("  protected contexts: {}", dev.supports_protected_context());
    match dev.read_render_timestamp() {
        Ok(ts) => println!("  render timestamp:   {ts:#x}"),
        Err(e) => println!("  render timestamp:   unavailable ({e})"),
    }

    // 3. Context lifecycle
    println!("\n--- Contexts ---");
    let ctx = dev.create_context_ext(ContextCreateFlags::RECOVERABLE)?;
    println!("  created context {ctx}");
    dev.destroy_context(ctx)?;

    let wanted: Vec<EngineClass> = [EngineClass::Render, EngineClass::Copy]
        .into_iter()
        .filter(|&class| info.count(class) > 0)
        .collect();
    if !wanted.is_empty() {
        let ctx = dev.create_context_engines(&info, &wanted)?;
        println!("  created context {ctx} with engines {wanted:?}");
        dev.destroy_context(ctx)?;
    }

    Ok(())
}
