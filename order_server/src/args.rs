//! Command-line arguments for the order-book server.
use clap::Parser;
use order_common::net::DEFAULT_PORT;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// TCP port to listen on.
    #[clap(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Milliseconds between order-book snapshot broadcasts.
    #[clap(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    pub broadcast_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_configuration() {
        let args = Args::try_parse_from(["order_server"]).unwrap();
        assert_eq!(args.port, DEFAULT_PORT);
        assert_eq!(args.broadcast_ms, 1000);
    }

    #[test]
    fn zero_broadcast_interval_is_rejected() {
        assert!(Args::try_parse_from(["order_server", "--broadcast-ms", "0"]).is_err());
    }
}
