#![no_std]
#![no_main]

use core::fmt;

use fram_provision::console::{SerialPort, Session};
use fram_provision::crypto::entropy::{FallbackEntropy, PseudoEntropy, TimerNoiseEntropy};
use fram_provision::platform::fram_i2c::I2cFram;
use fram_provision::platform::hal::MonotonicTimer;
use fram_provision::platform::rp2040::{Rp2040Adc, Rp2040Timer};
use fram_provision::CredentialStore;
use fugit::RateExtU32;
use panic_halt as _;
use rp2040_hal::adc::Adc;
use rp2040_hal::gpio::{FunctionI2C, FunctionUart, Pin, PullUp};
use rp2040_hal::uart::{DataBits, Enabled, StopBits, UartConfig, UartDevice, UartPeripheral, ValidUartPinout};
use rp2040_hal::{pac, sio::Sio, watchdog::Watchdog, Clock, I2C};

const XOSC_CRYSTAL_FREQ: u32 = 12_000_000;
/// Канал АЦП на неподключённом GPIO26.
const NOISE_ADC_CHANNEL: u8 = 0;

struct UartConsole<D: UartDevice, P: ValidUartPinout<D>> {
    uart: UartPeripheral<Enabled, D, P>,
}

impl<D: UartDevice, P: ValidUartPinout<D>> fmt::Write for UartConsole<D, P> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.uart.write_full_blocking(s.as_bytes());
        Ok(())
    }
}

impl<D: UartDevice, P: ValidUartPinout<D>> SerialPort for UartConsole<D, P> {
    fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.uart.read_raw(&mut byte) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }
}

#[rp2040_hal::entry]
fn main() -> ! {
    let mut pac = pac::Peripherals::take().unwrap();
    let mut watchdog = Watchdog::new(pac.WATCHDOG);
    let clocks = rp2040_hal::clocks::init_clocks_and_plls(
        XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    let sio = Sio::new(pac.SIO);
    let pins = rp2040_hal::gpio::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    // TIMER выводится из reset здесь; дальше время читается напрямую из регистров.
    let _hal_timer = rp2040_hal::Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);
    let _hal_adc = Adc::new(pac.ADC, &mut pac.RESETS);

    let uart_pins = (
        pins.gpio0.into_function::<FunctionUart>(),
        pins.gpio1.into_function::<FunctionUart>(),
    );
    let uart = UartPeripheral::new(pac.UART0, uart_pins, &mut pac.RESETS)
        .enable(
            UartConfig::new(115_200.Hz(), DataBits::Eight, None, StopBits::One),
            clocks.peripheral_clock.freq(),
        )
        .unwrap();

    let sda: Pin<_, FunctionI2C, PullUp> = pins.gpio4.reconfigure();
    let scl: Pin<_, FunctionI2C, PullUp> = pins.gpio5.reconfigure();
    let i2c = I2C::i2c0(
        pac.I2C0,
        sda,
        scl,
        100.kHz(),
        &mut pac.RESETS,
        &clocks.system_clock,
    );

    let timer = Rp2040Timer::new();
    let boot_seed = {
        let mut seed = [0u8; 32];
        seed[..8].copy_from_slice(&timer.now_micros().to_le_bytes());
        seed
    };
    let adc = Rp2040Adc::new(NOISE_ADC_CHANNEL).unwrap();
    let entropy = FallbackEntropy::new(
        TimerNoiseEntropy::new(Rp2040Timer::new(), adc),
        PseudoEntropy::new(boot_seed),
    );

    let store = CredentialStore::new(I2cFram::new(i2c));
    let mut session = Session::new(UartConsole { uart }, store, timer, entropy);
    session.run()
}
