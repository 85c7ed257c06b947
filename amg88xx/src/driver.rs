// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
use core::fmt::Write as _;

use arrayvec::{ArrayString, ArrayVec};
use embedded_hal::blocking::delay::DelayMs;
use paste::paste;

use crate::conversion::*;
use crate::error::{Error, LibraryError};
use crate::interface::Interface;
use crate::register::*;
use crate::settings::Settings;
use crate::util::is_bit_set;

/// How long to wait after entering normal mode before resetting the sensor.
const POWER_ON_SETTLE_MS: u32 = 50;

/// How long to wait after an initial reset before issuing the flag reset.
const RESET_SETTLE_MS: u32 = 2;

/// The debug output sink. Each call is one line of text.
pub type DebugPrint = fn(&str);

/// Called once for each status flag found by [`Amg8833::irq_handler`].
pub type ReceiveCallback = fn(StatusFlag);

/// DRY macro for the set_* methods in `Amg8833` that modify a single bit of a register.
///
/// The rest of the register is preserved by reading it first.
macro_rules! set_register_field {
    { $register:ident, $bit:literal, $field:ident, $typ:ty, $doc:literal } => {
    paste! {
        #[doc = $doc]
        pub fn [< set_ $field >](&mut self, new_value: $typ) -> Result<(), Error<IF::Error>> {
            self.update_bit(Register::$register, $bit, new_value.to_bit())
        }
    }};
}

/// DRY macro for the getter and setter of an interrupt level register pair.
macro_rules! interrupt_level {
    { $level:ident, $low:ident, $high:ident, $doc:literal } => {
    paste! {
        #[doc = "Get the " $doc " level, in units of 0.25℃."]
        pub fn [< interrupt_ $level _level >](&mut self) -> Result<i16, Error<IF::Error>> {
            let low = self.read_byte(Register::$low)?;
            let high = self.read_byte(Register::$high)?;
            Ok(decode_interrupt_level(low, high))
        }

        #[doc = "Set the " $doc " level, in units of 0.25℃."]
        ///
        /// Use [`interrupt_level_to_register`] to convert from ℃. Valid levels are -2048 to 2047
        /// (-512℃ to 511.75℃). Only the lower 12 bits of the level are written, so anything
        /// outside that range wraps around.
        pub fn [< set_interrupt_ $level _level >](&mut self, level: i16) -> Result<(), Error<IF::Error>> {
            let [low, high] = encode_interrupt_level(level);
            self.write_byte(Register::$low, low)?;
            self.write_byte(Register::$high, high)
        }
    }};
}

/// Static information about the AMG8833.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChipInfo {
    pub chip_name: &'static str,
    pub manufacturer_name: &'static str,
    pub interface: &'static str,
    pub supply_voltage_min_v: f32,
    pub supply_voltage_max_v: f32,
    pub max_current_ma: f32,
    pub temperature_min: f32,
    pub temperature_max: f32,
    pub driver_version: u32,
}

pub const CHIP_INFO: ChipInfo = ChipInfo {
    chip_name: "Panasonic AMG8833",
    manufacturer_name: "Panasonic",
    interface: "IIC",
    supply_voltage_min_v: 3.0,
    supply_voltage_max_v: 3.6,
    max_current_ma: 5.0,
    temperature_min: -20.0,
    temperature_max: 80.0,
    driver_version: 1000,
};

/// A driver for the AMG8833 8x8 thermopile array.
///
/// A driver starts out empty, with only an address. The [interface][Interface], a delay, a debug
/// output sink and a callback for interrupt events are then linked in, and [`init`] brings the
/// sensor up. After that, any of the other methods can be used until [`deinit`] puts the sensor
/// to sleep and closes the interface.
///
/// ```no_run
/// use amg88xx::{Address, Amg8833, I2cInterface, StatusFlag};
/// use linux_embedded_hal::{Delay, I2cdev};
///
/// fn print_line(line: &str) {
///     println!("{}", line);
/// }
///
/// fn print_flag(flag: StatusFlag) {
///     println!("interrupt: {:?}", flag);
/// }
///
/// let bus = I2cdev::new("/dev/i2c-1").expect("/dev/i2c-1 needs to be an I2C controller");
/// let mut sensor = Amg8833::new(Address::Low)
///     .link_interface(I2cInterface::new(bus))
///     .link_delay(Delay)
///     .link_debug_print(print_line)
///     .link_receive_callback(print_flag);
/// sensor.init()?;
/// let grid = sensor.read_temperature_array()?;
/// println!("Top left: {}℃", grid.get(0, 0));
/// sensor.deinit()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// All methods block until the bus transactions (and any settle times) are complete. The driver
/// is not internally synchronized; if the interrupt handler runs in a different context than the
/// rest of the code, wrap the driver in a mutex.
///
/// [`init`]: Amg8833::init
/// [`deinit`]: Amg8833::deinit
#[derive(Debug)]
pub struct Amg8833<IF, D> {
    interface: Option<IF>,

    delay: Option<D>,

    debug_print: Option<DebugPrint>,

    receive_callback: Option<ReceiveCallback>,

    /// The I²C address of the sensor.
    address: Address,

    initialized: bool,
}

impl<IF, D> Amg8833<IF, D> {
    /// Create an empty driver for a sensor at the given address.
    pub fn new(address: Address) -> Self {
        Self {
            interface: None,
            delay: None,
            debug_print: None,
            receive_callback: None,
            address,
            initialized: false,
        }
    }

    pub fn link_interface(mut self, interface: IF) -> Self {
        self.interface = Some(interface);
        self
    }

    pub fn link_delay(mut self, delay: D) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn link_debug_print(mut self, debug_print: DebugPrint) -> Self {
        self.debug_print = Some(debug_print);
        self
    }

    pub fn link_receive_callback(mut self, receive_callback: ReceiveCallback) -> Self {
        self.receive_callback = Some(receive_callback);
        self
    }

    /// The address the sensor is being accessed at.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Change the address the sensor is accessed at.
    ///
    /// This only changes the driver, the address is selected on the sensor by the AD_SELECT pin.
    pub fn set_address(&mut self, address: Address) {
        self.address = address;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Static information about the sensor.
    pub fn info() -> ChipInfo {
        CHIP_INFO
    }

    /// Take apart the driver, giving back the interface and delay.
    pub fn release(self) -> (Option<IF>, Option<D>) {
        (self.interface, self.delay)
    }

    fn debug(&self, message: &str) {
        if let Some(debug_print) = self.debug_print {
            debug_print(message);
        }
    }

    fn report_failure(&self, action: &str, register: u8) {
        let name = Register::try_from(register)
            .map(Register::name)
            .unwrap_or("unknown");
        let mut message: ArrayString<64> = ArrayString::new();
        // Debug output is best effort, a truncated message is fine.
        let _ = write!(message, "amg8833: {} {} register failed.", action, name);
        self.debug(&message);
    }

    /// Check that the driver can be used.
    fn check(&self) -> Result<(), LibraryError> {
        if self.interface.is_none() {
            Err(LibraryError::InvalidHandle)
        } else if !self.initialized {
            Err(LibraryError::NotInitialized)
        } else {
            Ok(())
        }
    }
}

impl<IF, D> Amg8833<IF, D>
where
    IF: Interface,
    D: DelayMs<u32>,
{
    /// Initialize the sensor.
    ///
    /// Every link must be present, otherwise [`LibraryError::Configuration`] is returned naming
    /// the first missing one. The interface is then opened, the sensor is put into normal mode
    /// and reset. If any of that fails the interface is closed again and the driver is left
    /// uninitialized, even if it was initialized before.
    pub fn init(&mut self) -> Result<(), Error<IF::Error>> {
        let debug_print = self
            .debug_print
            .ok_or(LibraryError::Configuration("debug_print"))?;
        if self.interface.is_none() {
            debug_print("amg8833: interface is null.");
            return Err(LibraryError::Configuration("interface").into());
        }
        if self.delay.is_none() {
            debug_print("amg8833: delay_ms is null.");
            return Err(LibraryError::Configuration("delay_ms").into());
        }
        if self.receive_callback.is_none() {
            debug_print("amg8833: receive_callback is null.");
            return Err(LibraryError::Configuration("receive_callback").into());
        }
        self.initialized = false;
        self.open()?;
        if let Err(err) = self.write_transport(Register::PowerControl, &[Mode::Normal.into()]) {
            self.close_quietly();
            return Err(err);
        }
        self.delay_ms(POWER_ON_SETTLE_MS);
        if let Err(err) = self.write_transport(Register::Reset, &[ResetType::Initial.into()]) {
            self.close_quietly();
            return Err(err);
        }
        self.delay_ms(RESET_SETTLE_MS);
        if let Err(err) = self.write_transport(Register::Reset, &[ResetType::Flag.into()]) {
            self.close_quietly();
            return Err(err);
        }
        self.initialized = true;
        Ok(())
    }

    /// Put the sensor to sleep and close the interface.
    ///
    /// If the sensor can't be put to sleep, the interface is left open and the driver is still
    /// initialized.
    pub fn deinit(&mut self) -> Result<(), Error<IF::Error>> {
        self.check()?;
        self.write_transport(Register::PowerControl, &[Mode::Sleep.into()])?;
        self.close()?;
        self.initialized = false;
        Ok(())
    }

    /// Read the status register, clear every flag that was set, and call the receive callback for
    /// each of them.
    ///
    /// The flags are dispatched in a fixed order: interrupt outbreak, temperature overflow, then
    /// thermistor overflow. The dispatched flags are also returned, in the same order. If reading
    /// or clearing the status fails, no callbacks are made.
    pub fn irq_handler(&mut self) -> Result<ArrayVec<StatusFlag, 3>, Error<IF::Error>> {
        let mut status = [0u8];
        self.read(Register::Status, &mut status)?;
        self.write(Register::StatusClear, &status)?;
        let status = Status::from_raw(status[0]);
        let mut dispatched = ArrayVec::new();
        for flag in status.flags() {
            if let Some(receive_callback) = self.receive_callback {
                receive_callback(flag);
            }
            dispatched.push(flag);
        }
        Ok(dispatched)
    }

    /// Get the current operating mode.
    pub fn mode(&mut self) -> Result<Mode, Error<IF::Error>> {
        let raw = self.read_byte(Register::PowerControl)?;
        Ok(Mode::from_raw(raw)?)
    }

    /// Set the operating mode.
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), Error<IF::Error>> {
        self.write_byte(Register::PowerControl, mode.into())
    }

    /// Send a reset command.
    pub fn reset(&mut self, reset_type: ResetType) -> Result<(), Error<IF::Error>> {
        self.write_byte(Register::Reset, reset_type.into())
    }

    /// Get the frame rate.
    ///
    /// The default is [10 FPS][FrameRate::Ten].
    pub fn frame_rate(&mut self) -> Result<FrameRate, Error<IF::Error>> {
        self.read_bit(Register::FrameRate, 0)
    }

    set_register_field! {
        FrameRate,
        0,
        frame_rate,
        FrameRate,
        "Set the frame rate."
    }

    /// Get how pixels are compared to the interrupt levels.
    pub fn interrupt_mode(&mut self) -> Result<InterruptMode, Error<IF::Error>> {
        self.read_bit(Register::InterruptControl, 1)
    }

    set_register_field! {
        InterruptControl,
        1,
        interrupt_mode,
        InterruptMode,
        "Set how pixels are compared to the interrupt levels."
    }

    /// Check if the interrupt output is enabled.
    pub fn interrupt_enabled(&mut self) -> Result<bool, Error<IF::Error>> {
        self.read_bit(Register::InterruptControl, 0)
    }

    set_register_field! {
        InterruptControl,
        0,
        interrupt_enabled,
        bool,
        "Enable (or disable) the interrupt output."
    }

    /// Get the moving average mode.
    pub fn average_mode(&mut self) -> Result<AverageMode, Error<IF::Error>> {
        self.read_bit(Register::Average, 5)
    }

    set_register_field! {
        Average,
        5,
        average_mode,
        AverageMode,
        "Set the moving average mode."
    }

    /// Read the status register.
    pub fn status(&mut self) -> Result<Status, Error<IF::Error>> {
        Ok(Status::from_raw(self.read_byte(Register::Status)?))
    }

    /// Clear a single flag in the status register.
    pub fn clear_status(&mut self, flag: StatusFlag) -> Result<(), Error<IF::Error>> {
        self.write_byte(Register::StatusClear, flag.mask())
    }

    interrupt_level! { high, InterruptHighLow, InterruptHighHigh, "interrupt upper" }

    interrupt_level! { low, InterruptLowLow, InterruptLowHigh, "interrupt lower" }

    interrupt_level! { hysteresis, HysteresisLow, HysteresisHigh, "interrupt hysteresis" }

    /// Convert a temperature (in ℃) to an interrupt level, truncating towards zero.
    pub fn interrupt_level_to_register(&self, temperature: f32) -> Result<i16, Error<IF::Error>> {
        self.check()?;
        Ok(interrupt_level_to_register(temperature))
    }

    /// Convert an interrupt level to a temperature (in ℃).
    pub fn register_to_interrupt_level(&self, raw: i16) -> Result<f32, Error<IF::Error>> {
        self.check()?;
        Ok(register_to_interrupt_level(raw))
    }

    /// Read the thermistor temperature.
    pub fn read_temperature(&mut self) -> Result<ThermistorReading, Error<IF::Error>> {
        let low = self.read_byte(Register::ThermistorLow)?;
        let high = self.read_byte(Register::ThermistorHigh)?;
        Ok(decode_thermistor(low, high))
    }

    /// Read the temperatures of every pixel.
    ///
    /// All of the pixel data is read in a single transaction, so the pixels all come from the same
    /// frame.
    pub fn read_temperature_array(&mut self) -> Result<TemperatureGrid, Error<IF::Error>> {
        let mut pixel_data = [0u8; PIXEL_BYTES];
        self.read(Register::PixelBase, &mut pixel_data)?;
        Ok(raw_to_temperature_grid(&pixel_data))
    }

    /// Read which pixels have crossed the interrupt levels.
    pub fn interrupt_table(&mut self) -> Result<InterruptTable, Error<IF::Error>> {
        let mut registers = [0u8; HEIGHT];
        // Top row first
        for (offset, register) in Register::INTERRUPT_TABLE.iter().enumerate().rev() {
            registers[offset] = self.read_byte(*register)?;
        }
        Ok(raw_to_interrupt_table(registers))
    }

    /// Write directly to registers, starting at `register`.
    pub fn set_register(&mut self, register: u8, data: &[u8]) -> Result<(), Error<IF::Error>> {
        self.check()?;
        self.write_raw(register, data)
    }

    /// Read directly from registers, starting at `register`.
    pub fn register(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), Error<IF::Error>> {
        self.check()?;
        self.read_raw(register, buffer)
    }

    /// Apply a group of settings, stopping at the first failure.
    ///
    /// When interrupts are configured, the levels and mode are set, then the flags are reset
    /// before enabling the interrupt output.
    pub fn configure(&mut self, settings: &Settings) -> Result<(), Error<IF::Error>> {
        self.set_mode(settings.mode)?;
        self.set_frame_rate(settings.frame_rate)?;
        self.set_average_mode(settings.average_mode)?;
        match &settings.interrupt {
            Some(interrupt) => {
                self.set_interrupt_high_level(interrupt_level_to_register(interrupt.high_level))?;
                self.set_interrupt_low_level(interrupt_level_to_register(interrupt.low_level))?;
                self.set_interrupt_hysteresis_level(interrupt_level_to_register(
                    interrupt.hysteresis_level,
                ))?;
                self.set_interrupt_mode(interrupt.mode)?;
                self.reset(ResetType::Flag)?;
                self.set_interrupt_enabled(true)
            }
            None => self.set_interrupt_enabled(false),
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        if let Some(delay) = self.delay.as_mut() {
            delay.delay_ms(ms);
        }
    }

    fn open(&mut self) -> Result<(), Error<IF::Error>> {
        let interface = self
            .interface
            .as_mut()
            .ok_or(LibraryError::InvalidHandle)?;
        match interface.open() {
            Ok(()) => Ok(()),
            Err(err) => {
                self.debug("amg8833: interface open failed.");
                Err(Error::Transport(err))
            }
        }
    }

    fn close(&mut self) -> Result<(), Error<IF::Error>> {
        let interface = self
            .interface
            .as_mut()
            .ok_or(LibraryError::InvalidHandle)?;
        match interface.close() {
            Ok(()) => Ok(()),
            Err(err) => {
                self.debug("amg8833: interface close failed.");
                Err(Error::Transport(err))
            }
        }
    }

    /// Close the interface after a failure, keeping the original error.
    fn close_quietly(&mut self) {
        if let Some(interface) = self.interface.as_mut() {
            let _ = interface.close();
        }
    }

    fn read_raw(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), Error<IF::Error>> {
        let address = self.address.into();
        let interface = self
            .interface
            .as_mut()
            .ok_or(LibraryError::InvalidHandle)?;
        match interface.read(address, register, buffer) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.report_failure("read", register);
                Err(Error::Transport(err))
            }
        }
    }

    fn write_raw(&mut self, register: u8, data: &[u8]) -> Result<(), Error<IF::Error>> {
        let address = self.address.into();
        let interface = self
            .interface
            .as_mut()
            .ok_or(LibraryError::InvalidHandle)?;
        match interface.write(address, register, data) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.report_failure("write", register);
                Err(Error::Transport(err))
            }
        }
    }

    /// Write without checking if the driver is initialized, for use while initializing.
    fn write_transport(&mut self, register: Register, data: &[u8]) -> Result<(), Error<IF::Error>> {
        self.write_raw(register.address(), data)
    }

    fn read(&mut self, register: Register, buffer: &mut [u8]) -> Result<(), Error<IF::Error>> {
        self.check()?;
        self.read_raw(register.address(), buffer)
    }

    fn write(&mut self, register: Register, data: &[u8]) -> Result<(), Error<IF::Error>> {
        self.check()?;
        self.write_raw(register.address(), data)
    }

    fn read_byte(&mut self, register: Register) -> Result<u8, Error<IF::Error>> {
        let mut buffer = [0u8];
        self.read(register, &mut buffer)?;
        Ok(buffer[0])
    }

    fn write_byte(&mut self, register: Register, value: u8) -> Result<(), Error<IF::Error>> {
        self.write(register, &[value])
    }

    fn read_bit<B: BitField>(&mut self, register: Register, bit: usize) -> Result<B, Error<IF::Error>> {
        let value = self.read_byte(register)?;
        Ok(B::from_bit(is_bit_set(value, bit)))
    }

    /// Read-modify-write a single bit in a register.
    fn update_bit(&mut self, register: Register, bit: u8, value: bool) -> Result<(), Error<IF::Error>> {
        let mut current = self.read_byte(register)?;
        current &= !(1 << bit);
        current |= (value as u8) << bit;
        self.write_byte(register, current)
    }
}
