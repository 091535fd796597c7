//! Integration tests for `DArray`: end-to-end scenarios, custom strategies
//! and the failure guarantees.

mod common;

use std::alloc::{self, Layout};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytemuck::{Pod, Zeroable};
use common::{Counting, Failing};
use darray::{ArrayFactory, DArray, Error, MemFuncs};

#[test]
fn test_push_sixteen_ints() {
    let mut array = DArray::<i32>::create(0).unwrap();
    for i in 0..=15 {
        array.push(i).unwrap();
    }
    assert_eq!(array.len(), 16);
    for i in 0..16 {
        assert_eq!(array[i], i as i32);
    }
}

#[test]
fn test_remove_range_middle() {
    let mut array = DArray::from_slice(&[0, 1, 2, 3, 4, 5]).unwrap();
    array.remove_range(2, 3);
    assert_eq!(array, [0, 1, 5]);
    assert_eq!(array.len(), 3);
}

#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
struct Point {
    x: f32,
    y: f32,
}

#[test]
fn test_struct_elements() {
    let mut points = DArray::<Point>::create(2).unwrap();
    assert_eq!(points[1], Point { x: 0.0, y: 0.0 });
    points.push(Point { x: 1.0, y: 2.0 }).unwrap();
    points.insert(0, Point { x: -1.0, y: 0.5 }).unwrap();
    points.swap(0, 3);

    assert_eq!(points.len(), 4);
    assert_eq!(points.elem_size(), 8);
    assert_eq!(points[0], Point { x: 1.0, y: 2.0 });
    assert_eq!(points[3], Point { x: -1.0, y: 0.5 });
}

#[test]
fn test_counting_strategy_sees_every_block() {
    let counter = Counting::shared();
    {
        let mut array = DArray::<u64, _>::create_in(0, Rc::clone(&counter)).unwrap();
        for i in 0..1000 {
            array.push(i).unwrap();
        }
        assert_eq!(counter.allocs.get(), 1);
        assert!(counter.reallocs.get() > 0);
        assert_eq!(counter.live(), 1);
    }
    assert_eq!(counter.releases.get(), 1);
    assert_eq!(counter.live(), 0);
}

#[test]
fn test_instances_keep_their_own_strategy() {
    let first = Counting::shared();
    let second = Counting::shared();

    let mut a = DArray::<u8, _>::create_in(0, Rc::clone(&first)).unwrap();
    let mut b = DArray::<u8, _>::create_in(0, Rc::clone(&second)).unwrap();
    a.resize(500).unwrap();
    b.resize(500).unwrap();
    b.resize(5000).unwrap();

    assert_eq!(first.reallocs.get(), 1);
    assert_eq!(second.reallocs.get(), 2);
    drop(a);
    assert_eq!(first.live(), 0);
    assert_eq!(second.live(), 1);
}

static FUNC_ALLOCS: AtomicUsize = AtomicUsize::new(0);
static FUNC_FREES: AtomicUsize = AtomicUsize::new(0);

fn counted_alloc(layout: Layout) -> *mut u8 {
    FUNC_ALLOCS.fetch_add(1, Ordering::SeqCst);
    unsafe { alloc::alloc(layout) }
}

unsafe fn counted_free(ptr: *mut u8, layout: Layout) {
    FUNC_FREES.fetch_add(1, Ordering::SeqCst);
    unsafe { alloc::dealloc(ptr, layout) }
}

#[test]
fn test_mem_funcs_triple() {
    let funcs = MemFuncs {
        alloc: counted_alloc,
        free: counted_free,
        ..MemFuncs::SYSTEM
    };
    {
        let mut array = DArray::<i16, _>::create_exact_in(0, funcs).unwrap();
        array.concat(&[1, 2, 3]).unwrap();
        assert_eq!(array, [1, 2, 3]);
    }
    assert_eq!(FUNC_ALLOCS.load(Ordering::SeqCst), 1);
    assert_eq!(FUNC_FREES.load(Ordering::SeqCst), 1);
}

#[test]
fn test_refused_create_reports_size() {
    let strategy = Failing::shared();
    strategy.arm();
    let err = DArray::<u32, _>::create_in(4, Rc::clone(&strategy)).unwrap_err();
    assert!(matches!(err, Error::AllocFailed { requested } if requested >= 40));
    assert!(err.is_alloc_failure());
    assert_eq!(strategy.refused.get(), 1);
}

#[test]
fn test_failed_mutations_change_nothing() {
    let strategy = Failing::shared();
    let mut array = DArray::<i32, _>::create_exact_in(0, Rc::clone(&strategy)).unwrap();
    array.concat(&[1, 2, 3]).unwrap();
    array.shrink_to_fit().unwrap();
    assert_eq!(array.capacity(), 3);

    let before = array.as_ptr();
    strategy.arm();

    assert!(array.push(4).is_err());
    assert!(array.insert(0, 4).is_err());
    assert!(array.insert_slice(1, &[7, 8]).is_err());
    assert!(array.concat(&[9]).is_err());
    assert!(array.reserve(1).is_err());
    assert!(array.resize(4).is_err());
    assert!(array.resize_exact(1).is_err());

    assert_eq!(strategy.refused.get(), 7);
    assert_eq!(array.as_ptr(), before);
    assert_eq!(array.len(), 3);
    assert_eq!(array.capacity(), 3);
    assert_eq!(array, [1, 2, 3]);

    // Nothing needs a new block here, so nothing is refused.
    assert_eq!(array.pop(), Some(3));
    assert_eq!(array.remove(0), 1);
    array.resize(2).unwrap();
    array.reserve(0).unwrap();
    assert_eq!(array, [2, 0]);

    strategy.disarm();
    array.push(10).unwrap();
    assert_eq!(array, [2, 0, 10]);
}

#[test]
fn test_iteration_bound_is_fixed() {
    let mut array = DArray::from_slice(&[1, 2, 3]).unwrap();
    let visited: Vec<i32> = array.iter().copied().collect();
    array.push(4).unwrap();
    assert_eq!(visited, [1, 2, 3]);
}

#[test]
fn test_factory_binds_strategy() {
    let counter = Counting::shared();
    let factory = ArrayFactory::with_strategy(Rc::clone(&counter)).exact();

    let a = factory.array::<u8>(4).unwrap();
    let b = factory.array_from(&[1u32, 2]).unwrap();
    assert_eq!(a.capacity(), 4);
    assert_eq!(b, [1, 2]);
    assert_eq!(counter.live(), 2);
    drop((a, b));
    assert_eq!(counter.live(), 0);
}
