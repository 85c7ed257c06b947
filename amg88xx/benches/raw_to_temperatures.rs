// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use amg88xx::conversion::{raw_to_interrupt_table, raw_to_temperature_grid};
use amg88xx::{Address, Amg8833, I2cInterface, StatusFlag};
use amg88xx_test_data::{MockSensor, HAND_FRAME};

fn ignore_line(_line: &str) {}

fn ignore_flag(_flag: StatusFlag) {}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Pixels to Temperatures");
    group.bench_function("raw_to_temperature_grid", |b| {
        b.iter(|| raw_to_temperature_grid(black_box(&HAND_FRAME)))
    });
    group.bench_function("raw_to_interrupt_table", |b| {
        b.iter(|| raw_to_interrupt_table(black_box([0x01, 0, 0x18, 0, 0, 0x3C, 0, 0x80])))
    });
    group.bench_function("read_temperature_array", |b| {
        let mock = MockSensor::new(Address::Low.into());
        mock.set_pixels(&HAND_FRAME);
        let mut sensor = Amg8833::new(Address::Low)
            .link_interface(I2cInterface::new(mock.clone()))
            .link_delay(mock.delay())
            .link_debug_print(ignore_line)
            .link_receive_callback(ignore_flag);
        sensor.init().unwrap();
        b.iter_batched(
            || mock.clear_operations(),
            |_| sensor.read_temperature_array().unwrap(),
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
