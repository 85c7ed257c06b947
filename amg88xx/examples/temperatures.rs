// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
use std::env;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use linux_embedded_hal::{Delay, I2cdev};

use amg88xx::{Address, Amg8833, I2cInterface, Settings, StatusFlag, TemperatureGrid, WIDTH};

fn print_line(line: &str) {
    eprintln!("{}", line);
}

fn ignore_interrupt(_flag: StatusFlag) {}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 4 {
        bail!("Arguments: <I2C bus> [0x68|0x69] [num_frames]");
    }
    let address = match args.get(2).map(String::as_str) {
        None | Some("0x68") => Address::Low,
        Some("0x69") => Address::High,
        Some(other) => bail!("{} is not an AMG8833 address", other),
    };
    let num_frames: usize = match args.get(3) {
        Some(count) => count.parse()?,
        None => 1,
    };
    let bus_path = Path::new(&args[1]);
    let bus = I2cdev::new(bus_path).context("The given path should work as an I2C device")?;
    let mut sensor = Amg8833::new(address)
        .link_interface(I2cInterface::new(bus))
        .link_delay(Delay)
        .link_debug_print(print_line)
        .link_receive_callback(ignore_interrupt);
    sensor.init().map_err(|err| anyhow!("{}", err))?;
    sensor
        .configure(&Settings::default())
        .map_err(|err| anyhow!("{}", err))?;
    // Wait for the first pair of frames to be averaged
    sleep(Duration::from_millis(200));
    for _ in 0..num_frames {
        let thermistor = sensor
            .read_temperature()
            .map_err(|err| anyhow!("{}", err))?;
        let grid = sensor
            .read_temperature_array()
            .map_err(|err| anyhow!("{}", err))?;
        println!("Thermistor: {:.4}℃", thermistor.temperature);
        print_temperatures(&grid);
        println!();
        sleep(Duration::from_millis(100));
    }
    sensor.deinit().map_err(|err| anyhow!("{}", err))?;
    Ok(())
}

fn print_temperatures(grid: &TemperatureGrid) {
    for (count, temperature) in grid.iter().enumerate() {
        if count % WIDTH == 0 {
            println!();
        }
        print!("{:6.2}  ", temperature);
    }
    println!();
}
