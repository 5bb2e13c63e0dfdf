use std::{
    error::Error,
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use clap::Parser;
use log::{error, info};
use rilctl::{
    DataProfile, PinPolicy, Request, Session, SessionConfig,
    config::{DEFAULT_DRAIN_TIMEOUT, DEFAULT_POLL_INTERVAL},
};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Address of the radio daemon socket
    #[arg(default_value = "127.0.0.1:6555")]
    address: SocketAddr,
    /// Access point name used for the data call
    #[arg(long, default_value = "internet")]
    apn: String,
    #[arg(long, default_value = "")]
    username: String,
    #[arg(long, default_value = "")]
    password: String,
    /// 0 none, 1 PAP, 2 CHAP, 3 PAP or CHAP
    #[arg(long, default_value = "0")]
    auth_type: String,
    #[arg(long, default_value = "IP")]
    pdp_type: String,
    /// SIM and data call records pad strings to an even number of code units
    #[arg(long)]
    aligned_strings: bool,
    /// Seconds to wait for outstanding replies on exit; 0 waits indefinitely
    #[arg(long, default_value_t = DEFAULT_DRAIN_TIMEOUT.as_secs())]
    drain_timeout: u64,
    /// Poll interval in milliseconds
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
    poll_interval: u64,
    /// Answer a SIM PIN request with --sim-pin
    #[arg(long, requires = "sim_pin")]
    enter_pin: bool,
    #[arg(long, env = "RILCTL_SIM_PIN", hide_env_values = true)]
    sim_pin: Option<String>,
    /// Number to dial once the radio is initialized
    #[arg(long)]
    dial: Option<String>,
}

impl Cli {
    fn config(&self) -> SessionConfig {
        let sim_pin = match (&self.sim_pin, self.enter_pin) {
            (Some(pin), true) => PinPolicy::Enter(pin.clone()),
            _ => PinPolicy::Disabled,
        };
        let drain_timeout = match self.drain_timeout {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        SessionConfig {
            address: self.address,
            poll_interval: Duration::from_millis(self.poll_interval),
            drain_timeout,
            aligned_strings: self.aligned_strings,
            data_profile: DataProfile {
                apn: self.apn.clone(),
                username: self.username.clone(),
                password: self.password.clone(),
                auth_type: self.auth_type.clone(),
                pdp_type: self.pdp_type.clone(),
                ..DataProfile::default()
            },
            sim_pin,
            ..SessionConfig::default()
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let stop = Arc::new(AtomicBool::new(false));
    let handle = Arc::clone(&stop);
    ctrlc::set_handler(move || handle.store(true, Ordering::Relaxed))?;

    let mut session = Session::connect(cli.config())?;

    // The peer announces its radio state before it accepts requests.
    let result = session.receive().and_then(|_| session.initialize()).and_then(|_| {
        if let Some(number) = &cli.dial {
            info!("dialing {number}");
            session.submit(Request::dial(number))?;
        }
        session.run(&stop)
    });
    if let Err(e) = result {
        error!("session failed: {e}");
        return Err(e.into());
    }

    session.close()?;
    Ok(())
}
