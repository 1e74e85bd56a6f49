/// Buttons pressed, one bit per button
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonMask(pub u32);

impl ButtonMask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, button: u8) {
        if button < 32 {
            self.0 |= 1 << button;
        }
    }

    pub fn release(&mut self, button: u8) {
        if button < 32 {
            self.0 &= !(1 << button);
        }
    }

    pub fn is_pressed(&self, button: u8) -> bool {
        button < 32 && self.0 & (1 << button) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Index of the highest pressed button
    pub fn highest_pressed(&self) -> Option<u8> {
        if self.0 == 0 {
            None
        } else {
            Some(31 - self.0.leading_zeros() as u8)
        }
    }
}

impl From<u32> for ButtonMask {
    fn from(mask: u32) -> Self {
        Self(mask)
    }
}
