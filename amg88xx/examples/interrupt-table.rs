// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
use std::env;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::sleep;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use linux_embedded_hal::{Delay, I2cdev};

use amg88xx::{
    Address, Amg8833, I2cInterface, InterruptMode, InterruptTable, Settings, StatusFlag, HEIGHT,
    WIDTH,
};

static OUTBREAK: AtomicBool = AtomicBool::new(false);

fn print_line(line: &str) {
    eprintln!("{}", line);
}

fn on_interrupt(flag: StatusFlag) {
    match flag {
        StatusFlag::InterruptOutbreak => OUTBREAK.store(true, Ordering::SeqCst),
        StatusFlag::TemperatureOverflow => println!("Pixel temperature overflow"),
        StatusFlag::ThermistorOverflow => println!("Thermistor temperature overflow"),
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        bail!("Three arguments required: <I2C bus> <upper level ℃> <lower level ℃>");
    }
    let bus_path = Path::new(&args[1]);
    let high_level: f32 = args[2].parse()?;
    let low_level: f32 = args[3].parse()?;
    if low_level >= high_level {
        bail!("The lower level must be below the upper level");
    }
    let bus = I2cdev::new(bus_path).context("The given path should work as an I2C device")?;
    let mut sensor = Amg8833::new(Address::Low)
        .link_interface(I2cInterface::new(bus))
        .link_delay(Delay)
        .link_debug_print(print_line)
        .link_receive_callback(on_interrupt);
    sensor.init().map_err(|err| anyhow!("{}", err))?;
    let settings = Settings::interrupt(InterruptMode::Absolute, high_level, low_level, 1.0);
    sensor
        .configure(&settings)
        .map_err(|err| anyhow!("{}", err))?;
    println!("Watching for pixels above {}℃ or below {}℃", high_level, low_level);
    // There's no INT pin hooked up here, so poll the status register once a frame.
    loop {
        sleep(Duration::from_secs(1));
        sensor.irq_handler().map_err(|err| anyhow!("{}", err))?;
        if OUTBREAK.swap(false, Ordering::SeqCst) {
            let table = sensor
                .interrupt_table()
                .map_err(|err| anyhow!("{}", err))?;
            print_table(&table);
        }
    }
}

fn print_table(table: &InterruptTable) {
    for row in 0..HEIGHT {
        let line: String = (0..WIDTH)
            .map(|column| if table.is_triggered(row, column) { '#' } else { '.' })
            .collect();
        println!("{}", line);
    }
    println!();
}
