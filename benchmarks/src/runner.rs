use crate::{args::Args, results::BenchmarkResults};
use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use hopper::{
    buffer::SizedBuffer,
    config::{ConsumerConfig, ProducerConfig},
    consumer::{BatchConsumer, Publish},
    producer::{BoundedQueueProducer, Producer},
    Service,
};
use log::debug;
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

fn generate_message(message_size: usize) -> String {
    (0..message_size)
        .map(|i| (i % 25 + 97) as u8 as char)
        .collect()
}

/// A sink that only counts what it receives.
#[derive(Debug, Default)]
pub struct CountingSink {
    batches: AtomicU64,
    messages: AtomicU64,
}

#[async_trait]
impl Publish<String> for CountingSink {
    async fn publish(&self, batch: Vec<String>) -> Result<bool> {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.messages.fetch_add(batch.len() as u64, Ordering::Relaxed);
        Ok(true)
    }
}

type BenchConsumer = BatchConsumer<SizedBuffer<String>, Arc<CountingSink>>;

pub struct BenchmarkRunner {
    producer: Arc<BoundedQueueProducer<String, BenchConsumer>>,
    sink: Arc<CountingSink>,
}

impl BenchmarkRunner {
    pub fn init(args: &Args) -> Result<Self> {
        let sink = Arc::new(CountingSink::default());
        let consumer = BatchConsumer::new(
            SizedBuffer::new(args.batch_size),
            sink.clone(),
            ConsumerConfig::new(),
        );
        let producer = BoundedQueueProducer::new(consumer, ProducerConfig::from(args))?;

        Ok(Self {
            producer: Arc::new(producer),
            sink,
        })
    }

    pub async fn run(&self, args: Args) -> Result<BenchmarkResults> {
        let message = generate_message(args.message_size as usize);
        let per_producer = args.num_of_messages / args.num_of_producers.max(1);
        let start = Instant::now();

        self.producer.start()?;

        let tasks = (0..args.num_of_producers).map(|_| {
            let producer = self.producer.clone();
            let message = message.clone();

            tokio::spawn(async move {
                let mut rejections = 0u64;

                for _ in 0..per_producer {
                    while !producer.try_enqueue_payload(message.clone()) {
                        rejections += 1;
                        tokio::task::yield_now().await;
                    }
                }

                rejections
            })
        });

        let mut rejections = 0;

        for result in join_all(tasks).await {
            rejections += result?;
        }

        self.producer.stop().await;
        let elapsed = start.elapsed();

        let delivered = self.sink.messages.load(Ordering::Relaxed);
        let batches = self.sink.batches.load(Ordering::Relaxed);
        debug!("Delivered {delivered} messages in {batches} batches");

        Ok(BenchmarkResults::calculate(
            elapsed,
            args,
            delivered,
            batches,
            rejections,
        ))
    }
}
