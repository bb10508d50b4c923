use alloy::primitives::{Address, U256};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dexscan::arb::direct::assess_direct;
use dexscan::arb::rate::oriented_rate;
use dexscan::arb::triangular::assess_cycle;
use dexscan::arb::ProfitPolicy;
use dexscan::models::Token;
use dexscan::venue::PoolReserves;
use itertools::Itertools;

/// Reference trade size and threshold
const POLICY: ProfitPolicy = ProfitPolicy::new(1000.0, 0.01);

/// Reference single swap gas cost
const GAS_COST: f64 = 12.0;

/// Quotes around 2000 with up to 5% spread
fn random_prices(count: usize) -> Vec<f64> {
    (0..count)
        .map(|_| 2000.0 * (1.0 + (fastrand::f64() - 0.5) * 0.1))
        .collect()
}

/// Rates close to 1, so that cycles sit around break-even
fn random_legs(count: usize) -> Vec<[f64; 3]> {
    (0..count)
        .map(|_| {
            let leg = || 1.0 + (fastrand::f64() - 0.5) * 0.04;
            [leg(), leg(), leg()]
        })
        .collect()
}

/// Compare every two venues the way one pair is compared in a scan
fn bench_direct(c: &mut Criterion) {
    let mut group = c.benchmark_group("assess_direct");

    for venue_count in [2, 8, 32, 128] {
        let prices = random_prices(venue_count);
        let comparisons = venue_count * (venue_count - 1) / 2;
        group.throughput(Throughput::Elements(comparisons as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(venue_count),
            &prices,
            |b, prices| {
                b.iter(|| {
                    prices
                        .iter()
                        .tuple_combinations::<(_, _)>()
                        .filter_map(|(a, b)| assess_direct(*a, *b, GAS_COST, &POLICY))
                        .filter(|assessment| assessment.is_profitable)
                        .count()
                });
            },
        );
    }

    group.finish();
}

/// Evaluate a batch of fully quoted cycles
fn bench_cycles(c: &mut Criterion) {
    let mut group = c.benchmark_group("assess_cycle");

    for cycle_count in [4, 64, 1024] {
        let legs = random_legs(cycle_count);
        group.throughput(Throughput::Elements(cycle_count as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(cycle_count),
            &legs,
            |b, legs| {
                b.iter(|| {
                    legs.iter()
                        .map(|[ab, bc, ca]| assess_cycle(*ab, *bc, *ca, GAS_COST * 3.0, &POLICY))
                        .filter(|assessment| assessment.is_profitable)
                        .count()
                });
            },
        );
    }

    group.finish();
}

/// Orient and normalize raw reserves
fn bench_oriented_rate(c: &mut Criterion) {
    let weth = Token::new("WETH", Address::repeat_byte(0x02), 18);
    let usdc = Token::new("USDC", Address::repeat_byte(0x01), 6);
    let reserves = PoolReserves {
        token0: usdc.address,
        reserve0: U256::from(40_000_000_000_000_u64),
        reserve1: U256::from(20_000_000_000_000_000_000_000_u128),
    };

    c.bench_function("oriented_rate", |b| {
        b.iter(|| oriented_rate(black_box(&reserves), &weth, &usdc));
    });
}

criterion_group!(benches, bench_direct, bench_cycles, bench_oriented_rate);
criterion_main!(benches);
