//! Stats aggregation: sum of per-worker packet counts and the maximum
//! last-seen sequence number across workers.

use std::sync::Arc;

use crate::worker::WorkerCounters;

/// `(packets_total, max_last_seq)`. Returns `(0, 0)` for an empty slice.
pub fn aggregate(counters: &[Arc<WorkerCounters>]) -> (u64, u64) {
    let mut packets_total = 0u64;
    let mut max_last_seq = 0u64;

    for c in counters {
        packets_total += c.packets();
        max_last_seq = max_last_seq.max(c.last_seq());
    }

    (packets_total, max_last_seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pool_is_zero() {
        assert_eq!(aggregate(&[]), (0, 0));
    }

    #[test]
    fn sums_packets_and_takes_max_last_seq() {
        let a = Arc::new(WorkerCounters::new());
        let b = Arc::new(WorkerCounters::new());

        for seq in 0..5u64 {
            a.record(seq);
        }
        for seq in 0..3u64 {
            b.record(seq + 100);
        }

        let (total, max_seq) = aggregate(&[a, b]);
        assert_eq!(total, 8);
        assert_eq!(max_seq, 102);
    }
}
