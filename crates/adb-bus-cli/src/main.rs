#![forbid(unsafe_code)]

// Native-only tool; keep a stub entry point so wasm workspace builds still link.
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod host;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use adb_bus::sim::{HostScript, SimBus};
    use adb_bus::{BusEngine, EngineConfig, Outcome};
    use adb_devices::{DeviceConfig, LoopbackChannel, SerialIngest};
    use adb_time::{Speed, TimingTable};
    use anyhow::{Context, Result};
    use clap::Parser;
    use tracing_subscriber::EnvFilter;

    use crate::host::{parse_hex_bytes, parse_u8, HostCommand};

    /// Idle time before the first host command, so queued ingest bytes land first.
    const LEAD_IN_US: u64 = 100;

    #[derive(Debug, Parser)]
    #[command(
        name = "adb-bus",
        about = "Run the bus device emulator against a simulated host and print what happened"
    )]
    pub struct Args {
        /// Device clock: `full` (16 MHz) or `half` (8 MHz).
        #[arg(long, default_value_t = Speed::Full)]
        speed: Speed,

        #[arg(long)]
        no_keyboard: bool,

        #[arg(long)]
        no_mouse: bool,

        #[arg(long)]
        no_arbitrary: bool,

        /// Mouse handler id restored on reset.
        #[arg(long, value_parser = parse_u8, default_value = "1")]
        mouse_handler: u8,

        /// Arbitrary device address restored on reset.
        #[arg(long, value_parser = parse_u8, default_value = "7")]
        arbitrary_address: u8,

        /// Arbitrary device handler id restored on reset.
        #[arg(long, value_parser = parse_u8, default_value = "0xFC")]
        arbitrary_handler: u8,

        /// Serial link bytes (hex) queued for the ingest feed before the run, e.g. "41 54".
        #[arg(long)]
        ingest: Option<String>,

        /// Log engine decisions at debug level (overrides RUST_LOG).
        #[arg(long, short)]
        verbose: bool,

        /// Host actions, in order: reset, talk:A:R, listen:A:R:HEX, flush:A, idle:US.
        #[arg(required = true)]
        commands: Vec<HostCommand>,
    }

    impl Args {
        fn engine_config(&self) -> EngineConfig {
            EngineConfig {
                timing: TimingTable::for_speed(self.speed),
                devices: DeviceConfig {
                    keyboard: !self.no_keyboard,
                    mouse: !self.no_mouse,
                    arbitrary: !self.no_arbitrary,
                    mouse_handler: self.mouse_handler,
                    arbitrary_address: self.arbitrary_address,
                    arbitrary_handler: self.arbitrary_handler,
                },
            }
        }
    }

    pub fn main() -> Result<()> {
        let args = Args::parse();
        init_logging(args.verbose);

        let script = args
            .commands
            .iter()
            .fold(HostScript::new().high_us(LEAD_IN_US), |script, cmd| {
                cmd.append_to(script)
            });

        let mut channel = LoopbackChannel::new();
        if let Some(hex) = &args.ingest {
            let bytes = parse_hex_bytes(hex)
                .map_err(anyhow::Error::msg)
                .context("parsing --ingest")?;
            channel.feed(&bytes);
        }

        let mut engine = BusEngine::new(
            SimBus::new(args.speed, script),
            SerialIngest::new(channel),
            args.engine_config(),
        )
        .context("invalid device configuration")?;

        while !engine.bus_mut().script_done() {
            match engine.service() {
                Outcome::Idle | Outcome::Spurious => {}
                outcome => println!("{outcome}"),
            }
            let replies = engine.ingest_mut().channel_mut().take_sent();
            for reply in replies {
                println!("serial reply {reply:02x}");
            }
        }

        let pending = engine.ingest_mut().channel().pending();
        if pending > 0 {
            tracing::warn!(pending, "ingest bytes left unread");
        }
        Ok(())
    }

    fn init_logging(verbose: bool) {
        let filter = if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
        };
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::main()
}
