//! COM1 backend for klog.

use core::fmt::{self, Write};

use spin::Mutex;
use uart_16550::SerialPort;

use crate::klog::KlogLevel;

const COM1_BASE: u16 = 0x3F8;

// SAFETY: 0x3F8 is the architectural COM1 base; nothing else drives it.
static COM1: Mutex<SerialPort> = Mutex::new(unsafe { SerialPort::new(COM1_BASE) });

/// Line writer that expands `\n` to `\r\n` for terminals attached to COM1.
struct CrlfWriter<'a>(&'a mut SerialPort);

impl Write for CrlfWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for (i, line) in s.split('\n').enumerate() {
            if i > 0 {
                self.0.write_str("\r\n")?;
            }
            self.0.write_str(line)?;
        }
        Ok(())
    }
}

/// klog backend: one locked write per line, level-tagged, CRLF terminated.
pub fn serial_backend(level: KlogLevel, args: fmt::Arguments<'_>) {
    let mut port = COM1.lock();
    let mut writer = CrlfWriter(&mut port);
    let _ = write!(writer, "[{}] ", level.tag());
    let _ = writer.write_fmt(args);
    let _ = writer.0.write_str("\r\n");
}

/// Program the UART and route klog through it.
pub fn init() {
    COM1.lock().init();
    crate::klog::klog_register_backend(serial_backend);
}
