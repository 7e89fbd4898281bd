use clap::Parser;
use clap_verbosity_flag::Verbosity;
use hopper::config::ProducerConfig;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Args {
    /// The number of messages to push through the pipeline
    #[arg(long, default_value_t = 1_000_000)]
    pub num_of_messages: u64,

    /// The number of concurrent tasks submitting messages
    #[arg(long, default_value_t = 4)]
    pub num_of_producers: u64,

    /// Size (in bytes) of the message payload
    #[arg(long, default_value_t = 32)]
    pub message_size: u64,

    /// Number of messages per published batch
    #[arg(long, default_value_t = 250)]
    pub batch_size: usize,

    /// Number of workers draining the queue
    #[arg(long, default_value_t = 4)]
    pub parallelism: usize,

    /// Capacity of the admission queue
    #[arg(long, default_value_t = 100_000)]
    pub max_queue_size: usize,

    /// Interval in millis after which a partial batch is flushed
    #[arg(long, default_value_t = 100)]
    pub flush_timeout: u64,

    /// Can be called multiple times to increase output
    #[clap(flatten)]
    pub verbose: Verbosity,
}

impl From<&Args> for ProducerConfig {
    fn from(args: &Args) -> Self {
        ProducerConfig::new()
            .max_queue_size(args.max_queue_size)
            .parallelism(args.parallelism)
            .flush_timeout(Duration::from_millis(args.flush_timeout))
            .incremental_wait(vec![
                Duration::from_micros(50),
                Duration::from_micros(200),
                Duration::from_millis(1),
            ])
    }
}
