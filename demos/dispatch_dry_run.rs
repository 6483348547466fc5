//! Dispatch Dry Run - walks through the scripted delivery steps
//!
//! Nothing is opened or typed; every step is logged instead.
//!
//! Run with: RUST_LOG=info cargo run --example dispatch_dry_run -p messaging <phone> [report.pdf]

use messaging::{DispatcherConfig, DryRunAutomation, Message, ScriptedWebDispatcher, Timings};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let phone = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("usage: dispatch_dry_run <phone> [report.pdf]"))?;

    let config = DispatcherConfig {
        timings: Timings::none(),
        ..DispatcherConfig::default()
    };
    let mut message = Message::new("Dear student, your academic report is ready.");
    if let Some(path) = args.next() {
        message = message.with_attachment(path);
    }

    let mut dispatcher = ScriptedWebDispatcher::new(DryRunAutomation::new(), &config);
    let outcome = dispatcher.send_to_phone(&phone, &message);

    for step in dispatcher.automation().steps() {
        println!("  {step}");
    }
    println!(
        "{}: {}",
        if outcome.delivered { "delivered" } else { "failed" },
        outcome.status
    );
    Ok(())
}
