//! Performance benchmarks for the bounds verifier
//!
//! Run with: cargo bench
//! Results are saved to target/criterion/

use bounds_verifier::core::ir::{ProcBuilder, Procedure};
use bounds_verifier::core::types::{AluOp, CmpPred};
use bounds_verifier::verifier::analyzer::analyze_procedure;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

// ============================================================================
// Procedure Generators
// ============================================================================

/// Straight-line procedure with `size` constant array accesses.
fn straight_line_procedure(size: usize) -> Procedure {
    let mut b = ProcBuilder::new("straight_line");
    let arr = b.alloc_array(64);
    for i in 0..size {
        let addr = b.index(arr, (i % 64) as i32);
        b.load(addr);
    }
    b.ret();
    b.finish().unwrap()
}

/// Chain of guarded accesses (one diamond per level).
fn guarded_procedure(depth: usize) -> Procedure {
    let mut b = ProcBuilder::new("guarded");
    let arr = b.alloc_array(30);
    let i = b.alloc_scalar();
    let r = b.call("rand");
    b.store(r, i);

    let end = b.block();
    for _ in 0..depth {
        let access = b.block();
        let next = b.block();

        let ix = b.load(i);
        let c = b.cmp(CmpPred::Lt, ix, 30);
        b.cond_br(c, access, next);

        b.switch_to(access);
        let iy = b.load(i);
        let addr = b.index(arr, iy);
        b.load(addr);
        b.br(next);

        b.switch_to(next);
    }
    b.br(end);
    b.switch_to(end);
    b.ret();
    b.finish().unwrap()
}

/// Counted loop writing through the array, the classic fixpoint workload.
fn loop_procedure(bound: i32) -> Procedure {
    let mut b = ProcBuilder::new("counted_loop");
    let head = b.block();
    let body = b.block();
    let exit = b.block();

    let arr = b.alloc_array(30);
    let k = b.alloc_scalar();
    b.store(0, k);
    b.br(head);

    b.switch_to(head);
    let kx = b.load(k);
    let c = b.cmp(CmpPred::Lt, kx, bound);
    b.cond_br(c, body, exit);

    b.switch_to(body);
    let ky = b.load(k);
    let addr = b.index(arr, ky);
    b.store(ky, addr);
    let k2 = b.load(k);
    let next = b.binop(AluOp::Add, k2, 1);
    b.store(next, k);
    b.br(head);

    b.switch_to(exit);
    b.ret();
    b.finish().unwrap()
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_straight_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("straight_line");
    for size in [16, 128, 1024] {
        let prog = straight_line_procedure(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &prog, |b, prog| {
            b.iter(|| analyze_procedure(black_box(prog)).unwrap());
        });
    }
    group.finish();
}

fn bench_guarded(c: &mut Criterion) {
    let mut group = c.benchmark_group("guarded_chain");
    for depth in [4, 16, 64] {
        let prog = guarded_procedure(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &prog, |b, prog| {
            b.iter(|| analyze_procedure(black_box(prog)).unwrap());
        });
    }
    group.finish();
}

fn bench_loop(c: &mut Criterion) {
    let prog = loop_procedure(30);
    c.bench_function("counted_loop", |b| {
        b.iter(|| analyze_procedure(black_box(&prog)).unwrap());
    });
}

criterion_group!(benches, bench_straight_line, bench_guarded, bench_loop);
criterion_main!(benches);
