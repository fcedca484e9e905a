/*!
Standard controller: an 8-bit parallel-in/serial-out shift register on $4016/$4017.

Behavior:
- Buttons are shifted out in the order A, B, Select, Start, Up, Down, Left, Right.
- Writing bit 0 of $4016 drives the strobe line of both ports. While strobe is high the
  register continuously reloads, so every read returns the live A button.
- With strobe low, each read returns the next bit; after eight reads the register has
  shifted in 1s from its serial input and keeps returning 1.
- Only bit 0 is driven; the bus supplies the upper open-bus bits.
*/

use bitflags::bitflags;

bitflags! {
    /// Button mask, bit order matches the serial read order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Buttons: u8 {
        const A      = 1 << 0;
        const B      = 1 << 1;
        const SELECT = 1 << 2;
        const START  = 1 << 3;
        const UP     = 1 << 4;
        const DOWN   = 1 << 5;
        const LEFT   = 1 << 6;
        const RIGHT  = 1 << 7;
    }
}

#[derive(Clone, Debug, Default)]
pub struct Controller {
    buttons: Buttons,
    shift: u8,
    strobe: bool,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear buttons.
    pub fn set_buttons(&mut self, buttons: Buttons, pressed: bool) {
        self.buttons.set(buttons, pressed);
    }

    /// Replace the whole live button state.
    pub fn set_state(&mut self, buttons: Buttons) {
        self.buttons = buttons;
    }

    pub fn buttons(&self) -> Buttons {
        self.buttons
    }

    /// CPU write to $4016 (bit 0 = strobe).
    pub fn write_strobe(&mut self, value: u8) {
        self.strobe = value & 1 != 0;
        if self.strobe {
            self.shift = self.buttons.bits();
        }
    }

    /// Serial read from $4016/$4017 for this port.
    pub fn read(&mut self) -> u8 {
        if self.strobe {
            self.shift = self.buttons.bits();
            return self.shift & 1;
        }
        let bit = self.shift & 1;
        self.shift = (self.shift >> 1) | 0x80;
        bit
    }
}
