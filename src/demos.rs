//! Bundled demonstration programs.
//!
//! Each demo is a hand-written program body standing in for generated
//! code, together with the source text it pretends to come from. Source
//! lines are numbered from 1, so the breakpoint table is one line longer
//! than the source.

use crate::diagnostics::{Fault, FaultClass, RuntimeFault};
use crate::runtime::{ExecutionContext, ProgramInfo, Supervisor, SupervisorBuilder};
use crate::value::Value;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Demo {
    Sum,
    Countdown,
    Divide,
    Bounds,
    Grid,
}

impl Demo {
    pub const ALL: [Demo; 5] = [
        Demo::Sum,
        Demo::Countdown,
        Demo::Divide,
        Demo::Bounds,
        Demo::Grid,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Demo::Sum => "sum",
            Demo::Countdown => "countdown",
            Demo::Divide => "divide",
            Demo::Bounds => "bounds",
            Demo::Grid => "grid",
        }
    }

    pub fn from_name(name: &str) -> Option<Demo> {
        Self::ALL.into_iter().find(|d| d.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Demo::Sum => "Read two integers (or take them as arguments) and print their sum",
            Demo::Countdown => "Fill a vector counting down from N (argument, default 5)",
            Demo::Divide => "Read two integers and divide them; fails on division by zero",
            Demo::Bounds => "Index past the end of a vector; fails with an index error",
            Demo::Grid => "Fill a 3x3 matrix row by row",
        }
    }

    pub fn source(self) -> &'static str {
        match self {
            Demo::Sum => SUM_SOURCE,
            Demo::Countdown => COUNTDOWN_SOURCE,
            Demo::Divide => DIVIDE_SOURCE,
            Demo::Bounds => BOUNDS_SOURCE,
            Demo::Grid => GRID_SOURCE,
        }
    }

    pub fn info(self) -> ProgramInfo {
        ProgramInfo::new(self.name(), self.source().lines().count() + 1)
            .with_functions(["main"])
            .with_source_file(format!("{}.step", self.name()))
    }

    /// Inspection collection sizes as `(scalars, vectors, matrices)`.
    pub fn inspection_layout(self) -> (usize, usize, usize) {
        match self {
            Demo::Sum => (3, 0, 0),
            Demo::Countdown => (1, 1, 0),
            Demo::Divide => (2, 0, 0),
            Demo::Bounds => (1, 1, 0),
            Demo::Grid => (0, 0, 1),
        }
    }

    pub fn builder(self) -> SupervisorBuilder {
        let info = self.info();
        match self {
            Demo::Sum => Supervisor::builder(sum, info),
            Demo::Countdown => Supervisor::builder(countdown, info),
            Demo::Divide => Supervisor::builder(divide, info),
            Demo::Bounds => Supervisor::builder(bounds, info),
            Demo::Grid => Supervisor::builder(grid, info),
        }
    }
}

impl fmt::Display for Demo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

const SUM_SOURCE: &str = "\
program sum
  integer a, b
  read(a)
  read(b)
  integer total = a + b
  write(\"sum = \", total)
end";

fn sum(ctx: &mut ExecutionContext, args: &[String]) -> Result<(), Fault> {
    let inspection = ctx.inspection();
    for id in 0..3 {
        inspection.declare_scalar(id);
    }

    let from_args = match args {
        [a, b] => Some((integer_arg(a, 3)?, integer_arg(b, 4)?)),
        _ => None,
    };

    ctx.pause_point(3, 3)?;
    let a = match from_args {
        Some((a, _)) => a,
        None => ctx.read_integer()?,
    };
    ctx.inspection().write_scalar(0, Value::from(a));

    ctx.pause_point(4, 3)?;
    let b = match from_args {
        Some((_, b)) => b,
        None => ctx.read_integer()?,
    };
    ctx.inspection().write_scalar(1, Value::from(b));

    ctx.pause_point(5, 3)?;
    let total = a
        .checked_add(b)
        .ok_or_else(|| RuntimeFault::new(FaultClass::Arithmetic, "integer overflow").at(5, 21))?;
    ctx.inspection().write_scalar(2, Value::from(total));

    ctx.pause_point(6, 3)?;
    ctx.write("sum = ")?;
    ctx.write(total)?;
    ctx.write("\n")
}

const COUNTDOWN_SOURCE: &str = "\
program countdown
  integer n = 5
  integer steps[n]
  for i from 0 to n - 1
    steps[i] = n - i
    write(steps[i], \" \")
  end for
  write(\"liftoff\")
end";

const MAX_COUNTDOWN: i64 = 20;

fn countdown(ctx: &mut ExecutionContext, args: &[String]) -> Result<(), Fault> {
    ctx.pause_point(2, 3)?;
    let n = match args.first() {
        Some(arg) => integer_arg(arg, 2)?,
        None => 5,
    };
    if !(1..=MAX_COUNTDOWN).contains(&n) {
        return Err(RuntimeFault::new(
            FaultClass::IllegalArgument,
            format!("n must be between 1 and {}, got {}", MAX_COUNTDOWN, n),
        )
        .at(2, 15)
        .into());
    }
    ctx.inspection().declare_scalar(0);
    ctx.inspection().write_scalar(0, Value::from(n));

    ctx.pause_point(3, 3)?;
    let len = n as usize;
    ctx.inspection().declare_vector(0, len);

    let mut steps = vec![0_i64; len];
    for (i, step) in steps.iter_mut().enumerate() {
        ctx.check_interrupted()?;
        ctx.pause_point(4, 3)?;
        ctx.pause_point(5, 5)?;
        *step = n - i as i64;
        ctx.inspection().write_vector(0, i, Value::from(*step));

        ctx.pause_point(6, 5)?;
        ctx.write(*step)?;
        ctx.write(" ")?;
    }

    ctx.pause_point(8, 3)?;
    ctx.write("liftoff\n")
}

const DIVIDE_SOURCE: &str = "\
program divide
  integer a, b
  read(a)
  read(b)
  write(a / b)
end";

fn divide(ctx: &mut ExecutionContext, _args: &[String]) -> Result<(), Fault> {
    ctx.inspection().declare_scalar(0);
    ctx.inspection().declare_scalar(1);

    ctx.pause_point(3, 3)?;
    let a = ctx.read_integer()?;
    ctx.inspection().write_scalar(0, Value::from(a));

    ctx.pause_point(4, 3)?;
    let b = ctx.read_integer()?;
    ctx.inspection().write_scalar(1, Value::from(b));

    ctx.pause_point(5, 3)?;
    let quotient = a
        .checked_div(b)
        .ok_or_else(|| division_fault(b).at(5, 11))?;
    ctx.write(quotient)?;
    ctx.write("\n")
}

const BOUNDS_SOURCE: &str = "\
program bounds
  integer values[5] = {1, 2, 3, 4, 5}
  integer i = 10
  write(values[i])
end";

fn bounds(ctx: &mut ExecutionContext, _args: &[String]) -> Result<(), Fault> {
    let values = [1_i64, 2, 3, 4, 5];

    ctx.pause_point(2, 3)?;
    ctx.inspection().declare_vector(0, values.len());
    for (i, v) in values.iter().enumerate() {
        ctx.inspection().write_vector(0, i, Value::from(*v));
    }

    ctx.pause_point(3, 3)?;
    let i: i64 = 10;
    ctx.inspection().declare_scalar(0);
    ctx.inspection().write_scalar(0, Value::from(i));

    ctx.pause_point(4, 3)?;
    let value = usize::try_from(i)
        .ok()
        .and_then(|idx| values.get(idx))
        .ok_or_else(|| RuntimeFault::index_out_of_bounds(i, values.len()))?;
    ctx.write(*value)?;
    ctx.write("\n")
}

const GRID_SOURCE: &str = "\
program grid
  integer grid[3][3]
  for row from 0 to 2
    for col from 0 to 2
      grid[row][col] = row * 3 + col
    end for
  end for
  write(grid[2][2])
end";

fn grid(ctx: &mut ExecutionContext, _args: &[String]) -> Result<(), Fault> {
    const SIZE: usize = 3;

    ctx.pause_point(2, 3)?;
    ctx.inspection().declare_matrix(0, SIZE, SIZE);
    let mut cells = [[0_i64; SIZE]; SIZE];

    for row in 0..SIZE {
        ctx.pause_point(3, 3)?;
        for col in 0..SIZE {
            ctx.pause_point(4, 5)?;
            ctx.pause_point(5, 7)?;
            let value = (row * SIZE + col) as i64;
            cells[row][col] = value;
            ctx.inspection().write_matrix(0, row, col, Value::from(value));
        }
    }

    ctx.pause_point(8, 3)?;
    ctx.write(cells[SIZE - 1][SIZE - 1])?;
    ctx.write("\n")
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn integer_arg(arg: &str, line: u32) -> Result<i64, Fault> {
    arg.trim().parse::<i64>().map_err(|_| {
        RuntimeFault::new(
            FaultClass::InvalidConversion,
            format!("'{}' is not an integer", arg),
        )
        .at(line, 1)
        .into()
    })
}

fn division_fault(divisor: i64) -> RuntimeFault {
    if divisor == 0 {
        RuntimeFault::division_by_zero()
    } else {
        RuntimeFault::new(FaultClass::Arithmetic, "integer overflow")
    }
}
