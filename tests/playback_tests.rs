// Tests for the gapless playback scheduler.

use anyhow::Result;
use velmo_live::audio::pcm;
use velmo_live::PlaybackScheduler;

#[test]
fn test_chunks_schedule_back_to_back() {
    let mut scheduler = PlaybackScheduler::new(1000);
    scheduler.enqueue(vec![0.0; 500]);
    scheduler.enqueue(vec![0.0; 250]);

    let scheduled = scheduler.drain(0.0);
    assert_eq!(scheduled.len(), 2);
    assert_eq!(scheduled[0].start, 0.0);
    assert_eq!(scheduled[1].start, 0.5, "Second chunk starts where the first ends");
    assert_eq!(scheduler.next_free_slot(), 0.75);
}

#[test]
fn test_chunks_never_overlap_or_reorder() {
    let mut scheduler = PlaybackScheduler::new(1000);
    for len in [100usize, 300, 50, 200] {
        scheduler.enqueue(vec![0.0; len]);
    }

    let scheduled = scheduler.drain(0.0);
    assert_eq!(scheduled.len(), 4);
    let lengths: Vec<usize> = scheduled.iter().map(|c| c.samples.len()).collect();
    assert_eq!(lengths, vec![100, 300, 50, 200], "Arrival order preserved");

    for pair in scheduled.windows(2) {
        assert!(
            pair[1].start >= pair[0].end(1000),
            "Chunk must not start before its predecessor ends"
        );
    }
}

#[test]
fn test_resume_after_gap_never_schedules_in_the_past() {
    let mut scheduler = PlaybackScheduler::new(1000);
    scheduler.enqueue(vec![0.0; 500]);
    scheduler.drain(0.0);
    assert_eq!(scheduler.next_free_slot(), 0.5);

    // The clock has moved well past the last scheduled chunk.
    scheduler.enqueue(vec![0.0; 100]);
    let scheduled = scheduler.drain(2.0);
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].start, 2.0, "Resumed chunk starts at the clock, not in the past");
    assert_eq!(scheduler.next_free_slot(), 2.1);
}

#[test]
fn test_pending_slot_wins_over_earlier_clock() {
    let mut scheduler = PlaybackScheduler::new(1000);
    scheduler.enqueue(vec![0.0; 500]);
    scheduler.drain(0.0);

    // The clock is still inside the previous chunk; the new one queues after it.
    scheduler.enqueue(vec![0.0; 100]);
    let scheduled = scheduler.drain(0.2);
    assert_eq!(scheduled[0].start, 0.5);
}

#[test]
fn test_drain_claim_is_exclusive() {
    let mut scheduler = PlaybackScheduler::new(1000);
    scheduler.enqueue(vec![0.0; 100]);

    assert!(scheduler.begin_drain());
    assert!(!scheduler.begin_drain(), "Second claim must lose");
    assert!(
        scheduler.drain(0.0).is_empty(),
        "Convenience drain yields nothing while a drain is claimed"
    );
    assert_eq!(scheduler.queued_chunks(), 1, "Losing drain leaves the queue alone");

    while scheduler.next_scheduled(0.0).is_some() {}
    scheduler.finish_drain();

    scheduler.enqueue(vec![0.0; 100]);
    assert_eq!(scheduler.drain(0.0).len(), 1, "Claim released after finish");
}

#[test]
fn test_enqueue_pcm_decodes_payload() -> Result<()> {
    let mut scheduler = PlaybackScheduler::new(1000);
    scheduler.enqueue_pcm(&pcm::encode(&[0.5, -0.5]))?;

    let scheduled = scheduler.drain(0.0);
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].samples.len(), 2);
    assert!((scheduled[0].samples[0] - 0.5).abs() < 1e-4);

    Ok(())
}

#[test]
fn test_enqueue_pcm_rejects_malformed_payload() {
    let mut scheduler = PlaybackScheduler::new(1000);
    assert!(scheduler.enqueue_pcm(&[0x01]).is_err());
    assert_eq!(scheduler.queued_chunks(), 0, "Rejected payload never queues");
}
