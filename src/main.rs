//! Reward Wheel headless driver
//!
//! Runs a batch of spins on a virtual clock and prints the payouts.
//!
//! Usage: `reward-wheel [spins] [seed] [preset]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let spins: u32 = args.first().and_then(|s| s.parse().ok()).unwrap_or(10);
    let seed: u64 = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(rand::random);
    let preset = args
        .get(2)
        .and_then(|s| reward_wheel::TimingPreset::from_str(s))
        .unwrap_or(reward_wheel::TimingPreset::Turbo);

    if let Err(e) = run(spins, seed, preset) {
        log::error!("Wheel failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library only on the web; the host page drives `Wheel::tick`
}

#[cfg(not(target_arch = "wasm32"))]
fn run(
    spins: u32,
    seed: u64,
    preset: reward_wheel::TimingPreset,
) -> Result<(), reward_wheel::WheelError> {
    use reward_wheel::consts::FRAME_MS;
    use reward_wheel::platform::{Clock, FrameClock, VirtualClock};
    use reward_wheel::sim::{PrizeCatalog, SpinPhase};
    use reward_wheel::{NullPresenter, Wallet, Wheel, WheelSettings};

    log::info!("Reward Wheel starting ({} preset, seed {seed})", preset.as_str());

    let mut wheel = Wheel::with_seed(
        WheelSettings::from_preset(preset),
        PrizeCatalog::default(),
        seed,
    )?;
    let mut presenter = NullPresenter;
    let mut wallet = Wallet::new();
    let mut clock = VirtualClock::new();
    let mut frames = FrameClock::new();
    frames.frames_due(clock.now_ms());

    for spin in 1..=spins {
        wheel.request_spin();
        while wheel.phase() != SpinPhase::Resolved {
            // Simulated display refresh slightly slower than the sim rate
            clock.advance(FRAME_MS * 1.25);
            for _ in 0..frames.frames_due(clock.now_ms()) {
                wheel.tick(&mut presenter, &mut wallet)?;
                wallet.tick(FRAME_MS);
                if wheel.phase() == SpinPhase::Resolved {
                    break;
                }
            }
        }

        if let Some(prize) = wheel.state().pending_prize() {
            println!("spin {spin:>3}: {}", prize.label());
        }
        wheel.acknowledge_resolution();
    }

    println!(
        "balance: {} coins, {} items collected, {} spins",
        reward_wheel::ledger::format_amount(wallet.balance()),
        wallet.inventory.len(),
        wheel.state().spins_resolved
    );
    Ok(())
}
