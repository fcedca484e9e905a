/*!
interfaces: lightweight views that decouple subsystems.

`PpuBusView` borrows exactly the fields the PPU needs (cartridge CHR and the console's
nametable/palette storage) and implements `PpuBus`. Because it is built from disjoint
fields of `Bus`, the PPU itself can be borrowed mutably at the same time.

Routing: the cartridge gets the first chance at every address; anything it does not
claim falls through to `PpuAddressSpace`.
*/

use crate::bus::ppu_space::PpuAddressSpace;
use crate::cartridge::Cartridge;
use crate::mapper::{Mapper, Mirroring};
use crate::ppu_bus::PpuBus;

pub(in crate::bus) struct PpuBusView<'a> {
    space: &'a mut PpuAddressSpace,
    cartridge: Option<&'a mut Cartridge>,
}

impl<'a> PpuBusView<'a> {
    #[inline]
    pub(in crate::bus) fn from_parts(
        space: &'a mut PpuAddressSpace,
        cartridge: Option<&'a mut Cartridge>,
    ) -> Self {
        Self { space, cartridge }
    }

    #[inline]
    fn mirroring(&self) -> Mirroring {
        self.cartridge
            .as_ref()
            .map_or(Mirroring::Horizontal, |cart| cart.mirroring())
    }
}

impl PpuBus for PpuBusView<'_> {
    #[inline]
    fn ppu_read(&self, addr: u16) -> u8 {
        let a = addr & 0x3FFF;
        if let Some(value) = self.cartridge.as_ref().and_then(|cart| cart.ppu_read(a)) {
            return value;
        }
        self.space.read(a, self.mirroring())
    }

    #[inline]
    fn ppu_write(&mut self, addr: u16, value: u8) {
        let a = addr & 0x3FFF;
        let mirroring = self.mirroring();
        if let Some(cart) = self.cartridge.as_mut() {
            if cart.ppu_write(a, value) {
                return;
            }
        }
        self.space.write(a, value, mirroring);
    }
}
