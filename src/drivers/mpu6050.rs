// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! InvenSense MPU-6050 6-axis IMU over blocking I2C.
//!
//! The driver configures ±250 deg/s and ±2 g full scale with the 44 Hz DLPF and reads all six axes
//! in one 14-byte burst starting at `ACCEL_XOUT_H`. Samples are returned in g and deg/s with the
//! chip's axes taken as the robot frame.

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c::{Write, WriteRead};

use crate::error::SensorError;
use crate::sensors::{Imu, ImuSample};

/// Default 7-bit address (AD0 low).
pub const DEFAULT_ADDRESS: u8 = 0x68;

// Register addresses
pub mod reg {
    pub const CONFIG: u8 = 0x1A;
    pub const GYRO_CONFIG: u8 = 0x1B;
    pub const ACCEL_CONFIG: u8 = 0x1C;
    pub const ACCEL_XOUT_H: u8 = 0x3B;
    pub const PWR_MGMT_1: u8 = 0x6B;
    pub const WHO_AM_I: u8 = 0x75;
}

const WHO_AM_I_VALUE: u8 = 0x68;

const DLPF_44HZ: u8 = 0x03;
const GYRO_FS_250: u8 = 0x00;
const ACCEL_FS_2G: u8 = 0x00;
const PWR_WAKE_PLL_X: u8 = 0x01;

/// LSB per deg/s at ±250 deg/s.
const GYRO_SENSITIVITY: f32 = 131.0;
/// LSB per g at ±2 g.
const ACCEL_SENSITIVITY: f32 = 16_384.0;

const WAKE_SETTLE_MS: u16 = 10;
const RETRY_PAUSE_MS: u16 = 50;

pub struct Mpu6050<I2C> {
    i2c: I2C,
    address: u8,
    initialized: bool,
}

impl<I2C, E> Mpu6050<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    /// Wrap the bus. The device is not touched until [`Mpu6050::init`].
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            initialized: false,
        }
    }

    /// Probe `WHO_AM_I`, wake the device and program the ranges.
    pub fn init<D: DelayMs<u16>>(&mut self, delay: &mut D) -> Result<(), SensorError> {
        self.initialized = false;

        let id = self.read_register(reg::WHO_AM_I)?;
        if id != WHO_AM_I_VALUE {
            log_error!("MPU-6050 WHO_AM_I mismatch: {}", id);
            return Err(SensorError::WrongDevice(id));
        }

        self.write_register(reg::PWR_MGMT_1, PWR_WAKE_PLL_X)?;
        delay.delay_ms(WAKE_SETTLE_MS);

        self.write_register(reg::CONFIG, DLPF_44HZ)?;
        self.write_register(reg::GYRO_CONFIG, GYRO_FS_250)?;
        self.write_register(reg::ACCEL_CONFIG, ACCEL_FS_2G)?;

        self.initialized = true;
        log_info!("MPU-6050 initialized at address {}", self.address);
        Ok(())
    }

    /// [`Mpu6050::init`] up to `attempts` times, pausing between tries.
    pub fn init_with_retries<D: DelayMs<u16>>(
        &mut self,
        delay: &mut D,
        attempts: u8,
    ) -> Result<(), SensorError> {
        let attempts = attempts.max(1);
        let mut result = Err(SensorError::NotInitialized);
        for attempt in 1..=attempts {
            result = self.init(delay);
            match result {
                Ok(()) => break,
                Err(_) => {
                    log_warn!("MPU-6050 init attempt {} failed", attempt);
                    if attempt < attempts {
                        delay.delay_ms(RETRY_PAUSE_MS);
                    }
                }
            }
        }
        result
    }

    #[cfg(test)]
    fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn free(self) -> I2C {
        self.i2c
    }

    fn read_register(&mut self, register: u8) -> Result<u8, SensorError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .map_err(|_| SensorError::Bus)?;
        Ok(buf[0])
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(|_| SensorError::Bus)
    }
}

impl<I2C, E> Imu for Mpu6050<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    fn read(&mut self) -> Result<ImuSample, SensorError> {
        if !self.initialized {
            return Err(SensorError::NotInitialized);
        }

        // ACCEL_XYZ (6) | TEMP (2) | GYRO_XYZ (6), big-endian
        let mut buf = [0u8; 14];
        self.i2c
            .write_read(self.address, &[reg::ACCEL_XOUT_H], &mut buf)
            .map_err(|_| SensorError::Bus)?;

        Ok(decode_burst(&buf))
    }
}

fn decode_burst(buf: &[u8; 14]) -> ImuSample {
    let word = |i: usize| i16::from_be_bytes([buf[i], buf[i + 1]]) as f32;

    let mut sample = ImuSample::default();
    for axis in 0..3 {
        sample.accel[axis] = word(axis * 2) / ACCEL_SENSITIVITY;
        sample.gyro[axis] = word(8 + axis * 2) / GYRO_SENSITIVITY;
    }
    sample
}
