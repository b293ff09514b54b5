use tessera::config::{EngineConfig, Mode};
use tessera::console::Console;

fn main() {
    env_logger::init();
    println!("tessera v{}, by {}", env!("CARGO_PKG_VERSION"), env!("CARGO_PKG_AUTHORS"));

    let config = match EngineConfig::from_args(std::env::args().skip(1)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Expected : perft <depth> [<FEN>]");
            eprintln!("       or [--depth N | --difficulty easy|medium|hard] [--threads N] [--color white|black] [--random] [--seed N] [--fen FEN]");
            std::process::exit(2);
        }
    };

    let outcome = match &config.mode {
        // Launches a perft test
        Mode::Perft { depth, fen } => tessera::perft(*depth, fen.clone()),
        Mode::Play => Console::new(&config).map(|mut console| console.run()),
    };
    if let Err(e) = outcome {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
