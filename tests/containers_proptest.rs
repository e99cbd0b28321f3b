use ownpool::{ArrayList, Error, LinkedList, Queue};
use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Clone, Debug)]
enum QueueOp {
    Enqueue(u16),
    Dequeue,
    Peek,
}

fn arb_queue_ops() -> impl Strategy<Value = (Option<usize>, Vec<QueueOp>)> {
    let op = prop_oneof![
        3 => any::<u16>().prop_map(QueueOp::Enqueue),
        2 => Just(QueueOp::Dequeue),
        1 => Just(QueueOp::Peek),
    ];
    (proptest::option::of(0usize..8), proptest::collection::vec(op, 1..100))
}

// Property: Queue matches VecDeque for FIFO order and the optional bound;
// values still queued at drop are disposed in FIFO order.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_queue_fifo((bound, ops) in arb_queue_ops()) {
        let disposed = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&disposed);
        let dispose = move |v: u16| sink.borrow_mut().push(v);
        let mut sut: Queue<u16, _> = match bound {
            Some(max) => Queue::bounded_with_dispose(max, dispose),
            None => Queue::with_dispose(dispose),
        };
        let mut model = VecDeque::new();
        for op in ops {
            match op {
                QueueOp::Enqueue(v) => {
                    let full = bound.is_some_and(|max| model.len() >= max);
                    match sut.enqueue(v) {
                        Ok(()) => {
                            prop_assert!(!full);
                            model.push_back(v);
                        }
                        Err(rejected) => {
                            prop_assert!(full);
                            prop_assert_eq!(
                                rejected.error(),
                                Error::CapacityExceeded { capacity: bound.unwrap() }
                            );
                            prop_assert_eq!(rejected.into_value(), v);
                        }
                    }
                }
                QueueOp::Dequeue => prop_assert_eq!(sut.dequeue(), model.pop_front()),
                QueueOp::Peek => prop_assert_eq!(sut.peek(), model.front()),
            }
            prop_assert_eq!(sut.len(), model.len());
        }
        prop_assert!(disposed.borrow().is_empty());
        drop(sut);
        prop_assert_eq!(&*disposed.borrow(), &model.into_iter().collect::<Vec<_>>());
    }
}

// Property: a fixed ArrayList rejects exactly at `len == capacity`; a
// growable one never rejects and grows in steps of ten.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_array_capacity(capacity in 1usize..20, values in proptest::collection::vec(any::<i32>(), 0..60)) {
        let mut fixed = ArrayList::fixed(capacity);
        let mut growable = ArrayList::with_capacity(capacity);
        for (n, v) in values.iter().copied().enumerate() {
            match fixed.add(v) {
                Ok(i) => {
                    prop_assert!(n < capacity);
                    prop_assert_eq!(i, n);
                }
                Err(rejected) => {
                    prop_assert!(n >= capacity);
                    prop_assert_eq!(rejected.error(), Error::CapacityExceeded { capacity });
                }
            }
            prop_assert_eq!(growable.add(v).ok(), Some(n));
            prop_assert!(growable.len() <= growable.capacity());
            prop_assert_eq!((growable.capacity() - capacity) % 10, 0);
        }
        prop_assert_eq!(fixed.capacity(), capacity);
        prop_assert_eq!(fixed.len(), values.len().min(capacity));
        prop_assert_eq!(growable.iter().copied().collect::<Vec<_>>(), values);
    }
}

// Property: LinkedList push/pop at both ends matches VecDeque.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_linked_list_ends(ops in proptest::collection::vec((0u8..4, any::<u8>()), 1..80)) {
        let mut sut = LinkedList::new();
        let mut model = VecDeque::new();
        for (kind, v) in ops {
            match kind {
                0 => { sut.push_front(v); model.push_front(v); }
                1 => { sut.push_back(v); model.push_back(v); }
                2 => prop_assert_eq!(sut.pop_front(), model.pop_front()),
                _ => prop_assert_eq!(sut.pop_back(), model.pop_back()),
            }
            prop_assert_eq!(sut.front(), model.front());
            prop_assert_eq!(sut.back(), model.back());
            prop_assert_eq!(sut.len(), model.len());
        }
        prop_assert_eq!(sut.iter().copied().collect::<Vec<_>>(), model.into_iter().collect::<Vec<_>>());
    }
}
