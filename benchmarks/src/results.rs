use crate::args::Args;
use num_format::{Locale, ToFormattedString};
use std::{fmt::Display, time::Duration};

#[derive(Debug)]
pub struct BenchmarkResults {
    duration: Duration,
    args: Args,
    delivered: u64,
    batches: u64,
    rejections: u64,
    total_mb_transferred: f64,
    avg_throughput: f64,
    avg_latency: f64,
}

impl BenchmarkResults {
    pub fn calculate(
        duration: Duration,
        args: Args,
        delivered: u64,
        batches: u64,
        rejections: u64,
    ) -> Self {
        let total_bytes_transferred = delivered * args.message_size;
        let total_mb_transferred = total_bytes_transferred as f64 / 1024.0 / 1024.0;
        let avg_throughput = total_mb_transferred / duration.as_secs_f64();
        let avg_latency = duration.as_nanos() as f64 / delivered.max(1) as f64;

        Self {
            duration,
            args,
            delivered,
            batches,
            rejections,
            total_mb_transferred,
            avg_throughput,
            avg_latency,
        }
    }
}

impl Display for BenchmarkResults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let duration = format!("{:.4} Secs", self.duration.as_secs_f64());
        let total_transferred = format!("{:.2} MB", self.total_mb_transferred);
        let avg_throughput = format!("{:.2} MB/s", self.avg_throughput);
        let avg_latency = format!("{:.2} ns", self.avg_latency);

        let summary = format!(
            "
Benchmark Results
---------------------
Number of Messages: {}
Number of Producers: {}
Workers: {}
Batch Size: {}
Delivered Messages: {}
Published Batches: {}
Rejected Submissions: {}",
            self.args.num_of_messages.to_formatted_string(&Locale::en),
            self.args.num_of_producers.to_formatted_string(&Locale::en),
            self.args.parallelism.to_formatted_string(&Locale::en),
            self.args.batch_size.to_formatted_string(&Locale::en),
            self.delivered.to_formatted_string(&Locale::en),
            self.batches.to_formatted_string(&Locale::en),
            self.rejections.to_formatted_string(&Locale::en),
        );

        let header = format!(
            "| {: <20} | {: <20} | {: <20} | {: <20} |",
            "Duration", "Total Transferred", "Avg. Throughput", "Avg. Latency"
        );

        let body = format!(
            "| {: <20} | {: <20} | {: <20} | {: <20} |",
            duration, total_transferred, avg_throughput, avg_latency
        );

        write!(f, "{summary}\n\n{header}\n{body}\n")
    }
}
