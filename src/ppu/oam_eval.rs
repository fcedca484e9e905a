#![doc = r#"
PPU sprite evaluation submodule

Responsibilities
- Clear secondary OAM to $FF on cycles 1-64 of each visible scanline.
- Run the incremental evaluation machine on cycles 65-256: odd cycles latch a byte from
  primary OAM, even cycles act on it.
- Select up to eight sprites intersecting the *next* scanline, preserving primary index
  order, and raise the overflow flag the way the hardware does (including its bug).

States
- `ReadYCoord`: copy the latched Y into the next free secondary slot. In range: note
  sprite 0 if this is sprite 0 and move to `ReadThreeBytes`. Out of range: next sprite.
- `ReadThreeBytes`: copy tile, attributes and X.
- `FindOverflow`: entered once eight sprites are held. The byte index `m` advances
  together with the sprite index `n` on every miss instead of staying at 0, so the
  comparison walks diagonally through OAM and reads tile/attribute/X bytes as Y.
- `OverflowBytes`: the three reads that follow an overflow hit, then `Done`.

Integration
- Called from `renderer.rs` on lines 0-239 with rendering enabled. Sprite fetch in
  `sprite.rs` consumes `secondary_oam` and `eval.found` at cycle 257.
"#]

use super::Ppu;
use super::registers::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(in crate::ppu) enum EvalState {
    #[default]
    ReadYCoord,
    ReadThreeBytes,
    FindOverflow,
    OverflowBytes(u8),
    Done,
}

/// Evaluation counters, reset at cycle 65.
#[derive(Debug, Clone, Copy, Default)]
pub(in crate::ppu) struct SpriteEval {
    pub state: EvalState,
    /// Primary OAM sprite index (0..=64).
    pub n: u8,
    /// Byte within the sprite record.
    pub m: u8,
    /// Sprites copied into secondary OAM so far.
    pub found: u8,
    pub latch: u8,
    /// Sprite 0 is in secondary slot 0 for the next line.
    pub sprite_zero_next: bool,
}

impl Ppu {
    /// One cycle of sprite evaluation on a visible, rendering line.
    pub(in crate::ppu) fn sprite_eval_cycle(&mut self) {
        match self.cycle {
            1..=64 => {
                if self.cycle & 1 == 0 {
                    self.secondary_oam[(self.cycle as usize - 1) / 2] = 0xFF;
                }
            }
            65..=256 => {
                if self.cycle == 65 {
                    self.eval = SpriteEval::default();
                }
                if self.cycle & 1 == 1 {
                    self.eval.latch = self.oam[self.eval_oam_index()];
                } else {
                    self.eval_step();
                }
            }
            _ => {}
        }
    }

    #[inline]
    fn eval_oam_index(&self) -> usize {
        (usize::from(self.eval.n) * 4 + usize::from(self.eval.m)) & 0xFF
    }

    #[inline]
    fn y_in_range(&self, y: u8) -> bool {
        let row = self.scanline - i16::from(y);
        (0..self.ctrl.sprite_height()).contains(&row)
    }

    fn eval_step(&mut self) {
        let latch = self.eval.latch;
        match self.eval.state {
            EvalState::ReadYCoord => {
                self.secondary_oam[usize::from(self.eval.found) * 4] = latch;
                if self.y_in_range(latch) {
                    if self.eval.n == 0 {
                        self.eval.sprite_zero_next = true;
                    }
                    self.eval.m = 1;
                    self.eval.state = EvalState::ReadThreeBytes;
                } else {
                    self.next_sprite();
                }
            }
            EvalState::ReadThreeBytes => {
                let slot = usize::from(self.eval.found) * 4 + usize::from(self.eval.m);
                self.secondary_oam[slot] = latch;
                self.eval.m += 1;
                if self.eval.m == 4 {
                    self.eval.m = 0;
                    self.eval.found += 1;
                    self.next_sprite();
                }
            }
            EvalState::FindOverflow => {
                if self.y_in_range(latch) {
                    self.status.insert(Status::SPRITE_OVERFLOW);
                    self.eval.m = (self.eval.m + 1) & 3;
                    self.eval.state = EvalState::OverflowBytes(3);
                } else {
                    self.eval.n += 1;
                    // Hardware bug: m should stay 0 here.
                    self.eval.m = (self.eval.m + 1) & 3;
                    if self.eval.n == 64 {
                        self.eval.state = EvalState::Done;
                    }
                }
            }
            EvalState::OverflowBytes(left) => {
                self.eval.state = if left > 1 {
                    EvalState::OverflowBytes(left - 1)
                } else {
                    EvalState::Done
                };
            }
            EvalState::Done => {}
        }
    }

    fn next_sprite(&mut self) {
        self.eval.n += 1;
        self.eval.state = if self.eval.n == 64 {
            EvalState::Done
        } else if self.eval.found == 8 {
            EvalState::FindOverflow
        } else {
            EvalState::ReadYCoord
        };
    }
}
