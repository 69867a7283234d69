// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Shared criterion setup for the layout benches.
//!
//! | variable | default | range |
//! |---|---|---|
//! | `SLD_BENCH_SAMPLES` | 40 | 10..=200 |
//! | `SLD_BENCH_WARMUP_SECS` | 2 | 1..=60 |
//! | `SLD_BENCH_MEASURE_SECS` | 4 | 1..=120 |
//! | `SLD_BENCH_PROFILE_HZ` | 100, `0` disables the flamegraph | 0..=1000 |

use std::str::FromStr;
use std::time::Duration;

use criterion::Criterion;
use pprof::criterion::{Output, PProfProfiler};

fn env_or<T: FromStr + Ord>(name: &str, default: T, min: T, max: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<T>().ok())
        .unwrap_or(default)
        .clamp(min, max)
}

struct Settings {
    samples: usize,
    warm_up: Duration,
    measurement: Duration,
    profile_hz: i32,
}

impl Settings {
    fn from_env() -> Self {
        Self {
            samples: env_or("SLD_BENCH_SAMPLES", 40, 10, 200),
            warm_up: Duration::from_secs(env_or("SLD_BENCH_WARMUP_SECS", 2, 1, 60)),
            measurement: Duration::from_secs(env_or("SLD_BENCH_MEASURE_SECS", 4, 1, 120)),
            profile_hz: env_or("SLD_BENCH_PROFILE_HZ", 100, 0, 1000),
        }
    }
}

pub fn criterion() -> Criterion {
    let settings = Settings::from_env();
    let criterion = Criterion::default()
        .sample_size(settings.samples)
        .warm_up_time(settings.warm_up)
        .measurement_time(settings.measurement);
    match settings.profile_hz {
        0 => criterion,
        hz => criterion.with_profiler(PProfProfiler::new(hz, Output::Flamegraph(None))),
    }
}
