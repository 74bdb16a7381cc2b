//! Banked byte storage mapped at a fixed offset.

/// How many banks are visible at once in the mapped window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankLayout {
    /// The whole window shows the active bank.
    Single,
    /// The low half always shows bank 0; the high half shows the active
    /// bank. Models the fixed + switchable cartridge ROM window.
    FixedPlusSwitchable,
}

/// One or more equally sized banks mapped into the 16-bit address space.
///
/// Addresses handed to [`MemoryModule::read`] and [`MemoryModule::write`]
/// must fall inside the mapped window; anything else is a routing bug in
/// the caller and panics.
#[derive(Debug, Clone)]
pub struct MemoryModule {
    data: Vec<u8>,
    bank_size: usize,
    offset: u16,
    active_bank: usize,
    layout: BankLayout,
}

impl MemoryModule {
    /// `banks` zero-filled banks of `bank_size` bytes mapped at `offset`.
    #[must_use]
    pub fn new(offset: u16, bank_size: usize, banks: usize, layout: BankLayout) -> Self {
        Self {
            data: vec![0; bank_size * banks],
            bank_size,
            offset,
            active_bank: usize::from(layout == BankLayout::FixedPlusSwitchable && banks > 1),
            layout,
        }
    }

    /// Build from existing bytes; a trailing partial bank is padded with
    /// 0xFF, as open cartridge ROM reads.
    #[must_use]
    pub fn from_bytes(offset: u16, bank_size: usize, banks: usize, layout: BankLayout, bytes: &[u8]) -> Self {
        let mut module = Self::new(offset, bank_size, banks, layout);
        let len = bytes.len().min(module.data.len());
        module.data[..len].copy_from_slice(&bytes[..len]);
        module.data[len..].fill(0xFF);
        module
    }

    /// Number of banks.
    #[must_use]
    pub fn bank_count(&self) -> usize {
        if self.bank_size == 0 {
            0
        } else {
            self.data.len() / self.bank_size
        }
    }

    #[must_use]
    pub fn active_bank(&self) -> usize {
        self.active_bank
    }

    /// Select the bank shown in the switchable part of the window.
    /// Out-of-range bank numbers wrap, as unconnected address lines do.
    pub fn set_active_bank(&mut self, bank: usize) {
        let count = self.bank_count();
        self.active_bank = if count == 0 { 0 } else { bank % count };
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn resolve(&self, address: u16) -> usize {
        debug_assert!(address >= self.offset, "{address:#06X} below module at {:#06X}", self.offset);
        let relative = usize::from(address - self.offset);
        match self.layout {
            BankLayout::FixedPlusSwitchable if relative < self.bank_size => relative,
            BankLayout::FixedPlusSwitchable => self.active_bank * self.bank_size + relative - self.bank_size,
            BankLayout::Single => {
                debug_assert!(relative < self.bank_size, "{address:#06X} past end of module");
                self.active_bank * self.bank_size + relative
            }
        }
    }

    #[must_use]
    pub fn read(&self, address: u16) -> u8 {
        self.data[self.resolve(address)]
    }

    pub fn write(&mut self, address: u16, value: u8) {
        let index = self.resolve(address);
        self.data[index] = value;
    }

    /// Read from an explicit bank regardless of the active one.
    #[must_use]
    pub fn read_banked(&self, bank: usize, relative: usize) -> u8 {
        let count = self.bank_count().max(1);
        self.data[(bank % count) * self.bank_size + relative]
    }

    /// All banks, in bank order.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable view of all banks, in bank order.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}
