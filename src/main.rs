#![no_main]
#![no_std]

use cortex_m_rt::entry;
use defmt_rtt as _;
use panic_halt as _;

use hal::{
    i2c::{BlockingI2c, Mode},
    pac,
    prelude::*,
    serial::{Config, Serial},
};
use stm32f7xx_hal as hal;

use mecabot::config::{
    ControllerConfig, BAUD_RATE, CYCLE_PERIOD_US, IMU_INIT_ATTEMPTS, LINK_READY_TIMEOUT_MS,
};
use mecabot::drivers::{mpu6050, HBridge, Mpu6050};
use mecabot::hw::{
    pins::LinePins, usart, Adc1, BoardPins, Led, MonoClock, ReflectanceArray, Tim4Pwm,
};
use mecabot::robot::{boot, LinkStatus, Robot};
use mecabot::log_info;

/// Heartbeat LED half-period, in cycles.
const HEARTBEAT_CYCLES: u32 = 100;

#[entry]
fn main() -> ! {
    // Peripherals
    let (Some(dp), Some(cp)) = (pac::Peripherals::take(), pac::CorePeripherals::take()) else {
        panic!("peripherals already taken");
    };
    let mut dcb = cp.DCB;
    let mut dwt = cp.DWT;

    // Clocks
    let mut rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.sysclk(216.MHz()).freeze();
    let sysclk_hz = clocks.sysclk().raw();

    let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD, dp.GPIOE);

    // LEDs
    let mut led_fault = Led::active_low(pins.leds.red);
    let mut led_link = Led::active_low(pins.leds.yellow);
    let mut led_heartbeat = Led::active_low(pins.leds.green);

    // USART1 (operator link)
    let usart_cfg = Config {
        baud_rate: BAUD_RATE.bps(),
        ..Default::default()
    };
    let serial = Serial::new(
        dp.USART1,
        (pins.usart1.tx, pins.usart1.rx),
        &clocks,
        usart_cfg,
    );
    let (mut tx, mut rx) = usart::split(serial);

    let mut clock = MonoClock::new(&mut dcb, &mut dwt, sysclk_hz);
    let cfg = ControllerConfig::default();

    // I2C1 + MPU-6050
    let i2c = BlockingI2c::i2c1(
        dp.I2C1,
        (pins.i2c1.scl, pins.i2c1.sda),
        Mode::standard(100.kHz()),
        &clocks,
        &mut rcc.apb1,
        10_000,
    );
    let mut delay = cortex_m::delay::Delay::new(cp.SYST, sysclk_hz);
    let mut imu = Mpu6050::new(i2c, mpu6050::DEFAULT_ADDRESS);
    let imu_init = imu.init_with_retries(&mut delay, IMU_INIT_ATTEMPTS);
    let imu_health = boot::imu_health(imu_init, cfg.imu_required);

    // Reflectance array
    let adc = Adc1::new(dp.ADC1);
    let _line_pins = pins.line;
    let line = ReflectanceArray::new(adc, LinePins::CHANNELS);

    // Motors: FL/FR/RL/RR on TIM4 CH1..CH4
    let m = pins.motors;
    let _pwm_pins = (m.fl_pwm, m.fr_pwm, m.rl_pwm, m.rr_pwm);
    let pwm = Tim4Pwm::new(dp.TIM4, clocks.timclk1().raw());
    let fl = HBridge::new(m.fl_dir, pwm.ch1);
    let fr = HBridge::new(m.fr_dir, pwm.ch2);
    let rl = HBridge::new(m.rl_dir, pwm.ch3);
    let rr = HBridge::new(m.rr_dir, pwm.ch4);

    // Host link
    let link = boot::wait_for_link(
        usart::usart1_rx_idle_high,
        || clock.now_us(),
        LINK_READY_TIMEOUT_MS,
    );
    led_link.set(link == LinkStatus::Ready);

    let mut robot = Robot::new(cfg, imu, imu_health, line, fl, fr, rl, rr);
    log_info!("control loop running");

    let mut next_cycle = clock.now_us();
    let mut cycles: u32 = 0;

    loop {
        robot.cycle(clock.now_us(), &mut rx, &mut tx);

        led_fault.set(robot.is_tripped() || robot.is_halted());
        cycles = cycles.wrapping_add(1);
        if cycles % HEARTBEAT_CYCLES == 0 {
            led_heartbeat.toggle();
        }

        next_cycle += CYCLE_PERIOD_US as u64;
        let now = clock.now_us();
        if now > next_cycle {
            // Overran; re-anchor instead of trying to catch up.
            next_cycle = now;
        }
        clock.wait_until(next_cycle);
    }
}
