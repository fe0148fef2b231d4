pub mod conf;
pub mod painting;
pub mod physics;

use clap::Parser;
use std::{
    path::PathBuf,
    sync::atomic::{AtomicBool, Ordering},
};

// Flag to true to signal to all thread to exit
static EXIT_SIGNAL: AtomicBool = AtomicBool::new(false);

#[inline]
/// To signal all thread to exit
/// used to exit from application
pub fn signal_exit() {
    EXIT_SIGNAL.store(true, Ordering::Release);
}

#[inline]
/// Check if it is time to exit from application
pub fn is_exit_application() -> bool {
    EXIT_SIGNAL.load(Ordering::Acquire)
}

const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Run ptanks paint simulation
#[derive(Parser)]
#[clap(version = VERSION, author = "Oreste Bernardi")]
pub struct Opts {
    //Log level to be used if environmental variable RUST_LOG is not set.
    #[clap(short, long, default_value = "warn",value_parser=["error","warn","info","debug","trace"])]
    pub log_level: String,
    /// Max number of simulation step. If 0 run until ctrl-c.
    #[clap(short, long, default_value = "0")]
    pub(crate) max_steps: u32,
    /// Simulation step x sec. This has no relation with ui frame rate.
    #[clap(long, default_value = "60.0")]
    pub sim_step_rate: f64,
    /// Number of tanks deployed in the arena.
    #[clap(short, long, default_value = "2")]
    pub num_tanks: usize,
    /// Configuration file
    #[clap(short, long)]
    pub configuration_file: Option<String>,
    /// Directory where painted textures and the paint report are saved at exit.
    #[clap(short, long, default_value = "paint_output")]
    pub output_dir: PathBuf,
}

pub fn enable_human_panic() {
    #[allow(unused_imports)]
    use human_panic::{handle_dump, print_msg, Metadata};
    #[allow(unused_imports)]
    use std::panic::{self, PanicInfo};

    #[cfg(not(debug_assertions))]
    match ::std::env::var("RUST_BACKTRACE") {
        Err(_) => {
            let meta = Metadata {
                version: env!("CARGO_PKG_VERSION").into(),
                name: env!("CARGO_PKG_NAME").into(),
                authors: env!("CARGO_PKG_AUTHORS").replace(":", ", ").into(),
                homepage: env!("CARGO_PKG_HOMEPAGE").into(),
            };

            panic::set_hook(Box::new(move |info: &PanicInfo| {
                let file_path = handle_dump(&meta, info);
                print_msg(file_path, &meta)
                    .expect("human-panic: printing error message to console failed");
                std::process::exit(-1);
            }));
        }
        Ok(_) => {}
    }
}
