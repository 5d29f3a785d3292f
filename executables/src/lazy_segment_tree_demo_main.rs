#![cfg_attr(feature = "strict", deny(warnings))]
#![cfg_attr(feature = "strict", deny(clippy::all))]
use algorithms::segment_tree::LazySegmentTree;
use common::{logging, SegError, SegResult};
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
struct Cli {
    #[structopt(long, default_value = "1", help = "Left border of the stress test tree")]
    left_bound: i64,
    #[structopt(long, default_value = "50", help = "Right border of the stress test tree")]
    right_bound: i64,
    #[structopt(
        short = "n",
        long,
        default_value = "10000",
        help = "Number of random operations checked against a plain vector"
    )]
    operations: usize,
    #[structopt(long, default_value = "42")]
    seed: u64,
}

fn main() -> SegResult<()> {
    logging::init_logging()?;

    let args = Cli::from_args();

    log::info!("Replaying the demo scenario...");
    demo_scenario().map_err(SegError::rethrow_with("demo scenario failed"))?;
    log::info!("Replaying the demo scenario... DONE");

    log::info!(
        "Running {} random operations on [{}, {}]...",
        args.operations,
        args.left_bound,
        args.right_bound
    );
    stress(&args).map_err(SegError::rethrow_with("stress test failed"))?;
    log::info!("Running random operations... DONE");

    Ok(())
}

fn log_sum(tree: &mut LazySegmentTree<i64>, left: i64, right: i64) -> SegResult<i64> {
    let sum = tree.get_sum(left, right)?;
    log::info!("Sum of range [{},{}] = {}", left, right, sum);
    Ok(sum)
}

fn expect_sum(tree: &mut LazySegmentTree<i64>, left: i64, right: i64, expected: i64) -> SegResult<()> {
    let sum = log_sum(tree, left, right)?;
    if sum == expected {
        Ok(())
    } else {
        Err(format!(
            "sum of [{}, {}] is {}, expected {}",
            left, right, sum, expected
        )
        .into())
    }
}

fn demo_scenario() -> SegResult<()> {
    let mut tree = LazySegmentTree::<i64>::new(1, 50)?;
    expect_sum(&mut tree, 2, 5, 0)?;

    tree.add(1, 1, 1)?;
    expect_sum(&mut tree, 2, 5, 0)?;
    expect_sum(&mut tree, 1, 2, 1)?;

    tree.add(-1, 1, 1)?;
    expect_sum(&mut tree, 2, 5, 0)?;
    expect_sum(&mut tree, 1, 2, 0)?;

    // Position i now holds i.
    for i in 1..=50 {
        tree.add(i, i, i)?;
    }
    expect_sum(&mut tree, 2, 5, 14)?;
    expect_sum(&mut tree, 1, 10, 55)?;

    for i in 1..=50 {
        tree.add(-i, i, i)?;
    }
    expect_sum(&mut tree, 2, 5, 0)?;
    expect_sum(&mut tree, 1, 10, 0)?;

    tree.add(5, 10, 23)?;
    expect_sum(&mut tree, 2, 15, 30)?;
    expect_sum(&mut tree, 10, 26, 70)?;

    Ok(())
}

fn stress(args: &Cli) -> SegResult<()> {
    let mut tree = LazySegmentTree::<i64>::new(args.left_bound, args.right_bound)?;
    let mut points = tree.values();
    let mut rng = XorShiftRng::seed_from_u64(args.seed);
    let offset = |position: i64| (position - args.left_bound) as usize;

    for step in 0..args.operations {
        let a = rng.gen_range(args.left_bound..=args.right_bound);
        let b = rng.gen_range(args.left_bound..=args.right_bound);
        let (left, right) = (a.min(b), a.max(b));

        if rng.gen_bool(0.5) {
            let delta = rng.gen_range(-1000..=1000);
            tree.add(delta, left, right)?;
            points[offset(left)..=offset(right)]
                .iter_mut()
                .for_each(|p| *p += delta);
        } else {
            let expected: i64 = points[offset(left)..=offset(right)].iter().sum();
            let sum = tree.get_sum(left, right)?;
            if sum != expected {
                return Err(format!(
                    "step {}: sum of [{}, {}] is {}, expected {}",
                    step, left, right, sum, expected
                )
                .into());
            }
        }
        log::debug!("step {} on [{}, {}] ok", step, left, right);
    }

    if tree.values() != points {
        return Err("point values diverged from the plain vector".into());
    }
    log::info!("Total sum after all operations = {}", tree.sum());
    Ok(())
}
