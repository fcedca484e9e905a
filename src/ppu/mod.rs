/*!
ppu - the 2C02 picture chip, stepped one dot at a time.

STRUCTURE:
- `Ppu` holds all state: register latches, loopy `v`/`t` scroll registers, OAM and
  secondary OAM, the background shift registers, the sprite evaluation machine, the
  scan-line sprite cache and two frame buffers of 6-bit palette indices.
- Memory fetches go through `crate::ppu_bus::PpuBus`; the PPU owns no VRAM.
- `clock` (renderer.rs) advances one dot. A frame is 341 x 262 dots, one fewer on odd
  frames while rendering.

OUTPUT:
- The back buffer is filled during lines 0-239. At (260,340) the buffers swap and
  `clock` returns `true`; `frame()` then holds the completed picture. Use
  `palette::frame_to_rgba` to turn it into pixels.

NOTES:
- NMI is surfaced as a request flag (`take_nmi_request`) that the console forwards to
  the CPU after each dot.
*/

/// Screen width in pixels.
pub const WIDTH: usize = 256;
/// Screen height in pixels.
pub const HEIGHT: usize = 240;

/// Dots per scanline.
pub const CYCLES_PER_SCANLINE: u16 = 341;
/// Scanlines per frame, counting the pre-render line.
pub const SCANLINES_PER_FRAME: u16 = 262;

pub(crate) mod fetch;
pub(crate) mod memory;
pub(crate) mod oam_eval;
pub mod palette;
pub mod registers;
pub(crate) mod renderer;
pub(crate) mod sprite;

pub use self::memory::OamEntry;
pub use self::registers::{Control, Mask, Status, VramAddress};

use self::fetch::BackgroundPipeline;
use self::oam_eval::SpriteEval;
use self::sprite::SpriteSlot;

pub struct Ppu {
    // CPU-visible registers
    ctrl: Control,
    mask: Mask,
    status: Status,
    oam_addr: u8,

    // Loopy scroll state
    v: VramAddress,
    t: VramAddress,
    fine_x: u8,
    write_toggle: bool,

    read_buffer: u8,
    io_latch: u8,

    oam: [u8; 256],
    secondary_oam: [u8; 32],

    // Timing
    cycle: u16,
    scanline: i16,
    odd_frame: bool,
    frame_count: u64,
    nmi_requested: bool,

    bg: BackgroundPipeline,
    eval: SpriteEval,
    slots: [SpriteSlot; 8],
    slot_count: u8,

    front: Box<[u8]>,
    back: Box<[u8]>,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    /// Power-on state, parked at the start of the pre-render line.
    pub fn new() -> Self {
        Self {
            ctrl: Control::empty(),
            mask: Mask::empty(),
            status: Status::empty(),
            oam_addr: 0,
            v: VramAddress::default(),
            t: VramAddress::default(),
            fine_x: 0,
            write_toggle: false,
            read_buffer: 0,
            io_latch: 0,
            oam: [0; 256],
            secondary_oam: [0xFF; 32],
            cycle: 0,
            scanline: -1,
            odd_frame: false,
            frame_count: 0,
            nmi_requested: false,
            bg: BackgroundPipeline::default(),
            eval: SpriteEval::default(),
            slots: [SpriteSlot::default(); 8],
            slot_count: 0,
            front: vec![0; WIDTH * HEIGHT].into_boxed_slice(),
            back: vec![0; WIDTH * HEIGHT].into_boxed_slice(),
        }
    }

    /// Last completed frame: `WIDTH * HEIGHT` palette indices, row-major.
    pub fn frame(&self) -> &[u8] {
        &self.front
    }

    /// Consume the pending NMI request, if any.
    pub fn take_nmi_request(&mut self) -> bool {
        std::mem::take(&mut self.nmi_requested)
    }

    #[inline]
    pub fn scanline(&self) -> i16 {
        self.scanline
    }

    #[inline]
    pub fn cycle(&self) -> u16 {
        self.cycle
    }

    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn odd_frame(&self) -> bool {
        self.odd_frame
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }

    #[inline]
    pub fn control(&self) -> Control {
        self.ctrl
    }

    #[inline]
    pub fn mask(&self) -> Mask {
        self.mask
    }

    /// Current VRAM address (`v`).
    #[inline]
    pub fn vram_address(&self) -> VramAddress {
        self.v
    }
}
