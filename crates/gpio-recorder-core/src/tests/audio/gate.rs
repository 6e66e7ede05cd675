use crate::{
    AudioError, CaptureFormat, Delivery, DeliveryGate, FaultHandler, QUEUE_DEPTH, SessionWriter,
    tests::sinks::StallingSink,
};

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

fn counting_fault_handler() -> (FaultHandler, Arc<AtomicUsize>) {
    let faults = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&faults);
    let handler: FaultHandler = Arc::new(move |_: AudioError| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (handler, faults)
}

/// WHAT: Buffers delivered while unbound are discarded
/// WHY: Between sessions there is no writer to receive audio
#[test]
fn given_unbound_gate_when_delivering_then_discarded() {
    // Given: A gate with no session bound
    let (handler, faults) = counting_fault_handler();
    let gate = DeliveryGate::new(handler);

    // When: Delivering a buffer
    let result = gate.deliver(&[0i16; 1024]);

    // Then: The buffer is dropped without a fault
    assert_eq!(result, Delivery::Discarded);
    assert!(!gate.is_bound());
    assert_eq!(faults.load(Ordering::SeqCst), 0);
}

/// WHAT: Bound gate queues buffers and unbind drains them into the session
/// WHY: The capture channel feeds the writer without coordinator involvement
#[test]
#[allow(clippy::unwrap_used)]
fn given_bound_gate_when_delivering_then_written_to_session() {
    // Given: A gate bound to a fresh session
    let dir = tempfile::tempdir().unwrap();
    let session =
        Arc::new(SessionWriter::create(dir.path().join("a.wav"), CaptureFormat::default()).unwrap());
    let (handler, _) = counting_fault_handler();
    let gate = DeliveryGate::new(handler);
    gate.bind(Arc::clone(&session)).unwrap();

    // When: Delivering two buffers then unbinding
    assert_eq!(gate.deliver(&[1i16; 1024]), Delivery::Queued);
    assert_eq!(gate.deliver(&[2i16; 1024]), Delivery::Queued);
    let unbound = gate.unbind().unwrap();

    // Then: The session received both buffers by the time unbind returned
    assert!(Arc::ptr_eq(&unbound, &session));
    assert_eq!(session.frames_written(), 2048);
}

/// WHAT: A stalled writer makes deliveries overrun instead of blocking
/// WHY: Slow storage must never hold up the audio thread
#[test]
#[allow(clippy::unwrap_used)]
fn given_stalled_storage_when_delivering_past_queue_then_overrun_without_blocking() {
    // Given: A session whose storage stalls every write
    let hold = Arc::new(AtomicBool::new(false));
    let sink = StallingSink::new(Arc::clone(&hold));
    let session =
        Arc::new(SessionWriter::from_sink("stalled.wav", CaptureFormat::default(), sink).unwrap());
    hold.store(true, Ordering::SeqCst);
    let (handler, faults) = counting_fault_handler();
    let gate = DeliveryGate::new(handler);
    gate.bind(Arc::clone(&session)).unwrap();

    // When: Delivering more buffers than the queue holds
    let outcomes: Vec<Delivery> = (0..QUEUE_DEPTH + 2)
        .map(|_| gate.deliver(&[3i16; 1024]))
        .collect();

    // Then: Deliveries returned at once, the excess was dropped
    let queued = outcomes.iter().filter(|o| **o == Delivery::Queued).count();
    assert!(outcomes.contains(&Delivery::Overrun));
    assert!(queued == QUEUE_DEPTH || queued == QUEUE_DEPTH + 1);

    // And: Once storage recovers, every queued buffer lands
    hold.store(false, Ordering::SeqCst);
    gate.unbind();
    assert_eq!(session.frames_written(), (queued * 1024) as u64);
    assert_eq!(faults.load(Ordering::SeqCst), 0);
}

/// WHAT: No buffer reaches a session after unbind returns, even mid-delivery
/// WHY: The coordinator closes the writer right after stopping the channel
#[test]
#[allow(clippy::unwrap_used)]
fn given_delivery_in_flight_when_unbinding_then_no_append_after_return() {
    // Given: A producer thread hammering the gate with large buffers
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race.wav");
    let session = Arc::new(SessionWriter::create(&path, CaptureFormat::default()).unwrap());
    let (handler, faults) = counting_fault_handler();
    let gate = Arc::new(DeliveryGate::new(handler));
    gate.bind(Arc::clone(&session)).unwrap();

    let running = Arc::new(AtomicBool::new(true));
    let outcomes = Arc::new(Mutex::new(Vec::new()));
    let producer = {
        let gate = Arc::clone(&gate);
        let running = Arc::clone(&running);
        let outcomes = Arc::clone(&outcomes);
        thread::spawn(move || {
            let buffer = vec![7i16; 64 * 1024];
            while running.load(Ordering::SeqCst) {
                let outcome = gate.deliver(&buffer);
                outcomes.lock().unwrap().push(outcome);
            }
        })
    };

    // Wait until the producer has written something.
    while session.bytes_written() == 0 {
        thread::yield_now();
    }

    // When: Unbinding while deliveries are in flight, then closing
    gate.unbind();
    let bytes_at_unbind = session.bytes_written();
    thread::sleep(Duration::from_millis(20));
    let summary = session.close().unwrap().unwrap();
    running.store(false, Ordering::SeqCst);
    producer.join().unwrap();

    // Then: Nothing was appended after unbind and whole buffers landed
    assert_eq!(summary.bytes_written, bytes_at_unbind);
    assert_eq!(bytes_at_unbind % (64 * 1024 * 2), 0);
    assert_eq!(faults.load(Ordering::SeqCst), 0);
    assert_eq!(
        outcomes.lock().unwrap().last().copied(),
        Some(Delivery::Discarded)
    );

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(u64::from(reader.len()) * 2, bytes_at_unbind);
}

/// WHAT: A failed append reports one fault and later buffers fail fast
/// WHY: Write failures are fatal and must reach the coordinator exactly once
#[test]
#[allow(clippy::unwrap_used)]
fn given_closed_session_when_delivering_then_fault_reported_once() {
    // Given: A gate bound to a session that has already been closed
    let dir = tempfile::tempdir().unwrap();
    let session =
        Arc::new(SessionWriter::create(dir.path().join("b.wav"), CaptureFormat::default()).unwrap());
    session.close().unwrap();
    let (handler, faults) = counting_fault_handler();
    let gate = DeliveryGate::new(handler);
    gate.bind(session).unwrap();

    // When: Delivering a buffer and waiting for the writer to fail
    assert_eq!(gate.deliver(&[0i16; 1024]), Delivery::Queued);
    let mut later = Delivery::Queued;
    for _ in 0..5_000 {
        if faults.load(Ordering::SeqCst) == 1 {
            later = gate.deliver(&[0i16; 1024]);
            if later == Delivery::Failed {
                break;
            }
        }
        thread::sleep(Duration::from_millis(1));
    }

    // Then: One fault, later deliveries fail, unbinding discards the rest
    assert_eq!(later, Delivery::Failed);
    assert!(gate.unbind().is_some());
    assert_eq!(gate.deliver(&[0i16; 1024]), Delivery::Discarded);
    assert!(!gate.is_bound());
    assert_eq!(faults.load(Ordering::SeqCst), 1);
}
