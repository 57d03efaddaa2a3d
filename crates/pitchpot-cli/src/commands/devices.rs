//! Audio output device listing.

use pitchpot_io::list_devices;

pub fn run() -> anyhow::Result<()> {
    let devices = list_devices()?;

    if devices.is_empty() {
        println!("No audio output devices found.");
        return Ok(());
    }

    println!("Output Devices");
    println!("==============\n");
    for (idx, device) in devices.iter().enumerate() {
        let marker = if device.is_default { " (default)" } else { "" };
        println!(
            "  [{}] {} ({} Hz, {} ch){}",
            idx, device.name, device.default_sample_rate, device.default_channels, marker
        );
    }

    println!();
    println!("Tip: select a device by partial name with --device or `audio.device`:");
    println!("  pitchpot run --device \"USB\"");
    Ok(())
}
