use gpd_crypto::CryptoBackend;
use gpd_data::{
    device::{GpdAddress, KeyType, SecurityLevel},
    frame::{Direction, GpdfHeader},
    security::CryptoProvider,
    Key,
};

use crate::platform::Platform;
use crate::Error;

/// Key material, security level and frame counter of the device
pub struct SecurityManager<CB> {
    crypto_provider: CryptoProvider<CB>,
    key: Option<Key>,
    security_level: SecurityLevel,
    key_type: KeyType,
    frame_counter: u32,
}

impl<CB> SecurityManager<CB>
where
    CB: CryptoBackend,
{
    pub fn new(
        crypto_backend: CB,
        key: Option<Key>,
        security_level: SecurityLevel,
        key_type: KeyType,
    ) -> Self {
        Self {
            crypto_provider: CryptoProvider::new(crypto_backend),
            key,
            security_level,
            key_type,
            frame_counter: 0,
        }
    }

    /// Resume from the frame counter stored by the platform
    pub fn restore_counter<P: Platform>(&mut self, platform: &mut P) {
        if let Some(counter) = platform.load_counter() {
            log::info!("Restored frame counter {}", counter);
            self.frame_counter = counter;
        }
    }

    /// Frame counter for the next frame
    ///
    /// The following counter is persisted before this one is handed out so
    /// that a power cycle never reissues a value.
    pub fn next_frame_counter<P: Platform>(&mut self, platform: &mut P) -> Result<u32, Error> {
        let counter = self.frame_counter;
        let next = counter.checked_add(1).ok_or(Error::CounterExhausted)?;
        platform.persist_counter(next)?;
        self.frame_counter = next;
        Ok(counter)
    }

    pub fn frame_counter(&self) -> u32 {
        self.frame_counter
    }

    pub fn key(&self) -> Option<Key> {
        self.key
    }

    pub fn security_level(&self) -> SecurityLevel {
        self.security_level
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// Install key material handed out during commissioning
    pub fn install(&mut self, key: Option<Key>, security_level: SecurityLevel, key_type: KeyType) {
        if key.is_some() {
            self.key = key;
        }
        self.security_level = security_level;
        self.key_type = key_type;
    }

    /// Secure a built frame, returns the length including the MIC
    pub fn protect(
        &mut self,
        address: &GpdAddress,
        header: &GpdfHeader,
        header_length: usize,
        length: usize,
        frame: &mut [u8],
    ) -> Result<usize, Error> {
        if !header.security_level().is_secured() {
            return Ok(length);
        }
        let key = self.key.ok_or(Error::NoKey)?;
        let length = self
            .crypto_provider
            .protect(address, header, header_length, length, &key, frame)?;
        Ok(length)
    }

    /// Verify and decrypt a received frame, returns the length without MIC
    pub fn unprotect(
        &mut self,
        address: &GpdAddress,
        header: &GpdfHeader,
        header_length: usize,
        length: usize,
        frame: &mut [u8],
    ) -> Result<usize, Error> {
        if !header.security_level().is_secured() {
            return Ok(length);
        }
        let key = self.key.ok_or(Error::NoKey)?;
        match self
            .crypto_provider
            .unprotect(address, header, header_length, length, &key, frame)
        {
            Ok(length) => Ok(length),
            Err(error) => {
                log::warn!("> Frame failed authentication, {:?}", error);
                Err(error.into())
            }
        }
    }

    /// Encrypt the device key for the commissioning GPDF
    pub fn encrypt_key(
        &mut self,
        address: &GpdAddress,
        frame_counter: u32,
    ) -> Result<(Key, u32), Error> {
        let key = self.key.ok_or(Error::NoKey)?;
        let result =
            self.crypto_provider
                .encrypt_key(address, Direction::FromDevice, frame_counter, &key)?;
        Ok(result)
    }

    /// Decrypt a key received in a commissioning reply
    pub fn decrypt_key(
        &mut self,
        address: &GpdAddress,
        frame_counter: u32,
        key: &Key,
        mic: u32,
    ) -> Result<Key, Error> {
        let key =
            self.crypto_provider
                .decrypt_key(address, Direction::ToDevice, frame_counter, key, mic)?;
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockPlatform;
    use gpd_crypto_rust_crypto::RustCryptoBackend;

    fn manager() -> SecurityManager<RustCryptoBackend> {
        SecurityManager::new(
            RustCryptoBackend::default(),
            Some(Key::from([0x11u8; 16])),
            SecurityLevel::Full,
            KeyType::IndividualKey,
        )
    }

    #[test]
    fn counter_is_monotonic() {
        let mut platform = MockPlatform::default();
        let mut security = manager();
        security.restore_counter(&mut platform);
        let mut previous = None;
        for _ in 0..10 {
            let counter = security.next_frame_counter(&mut platform).unwrap();
            if let Some(previous) = previous {
                assert!(counter > previous);
            }
            previous = Some(counter);
        }
        assert_eq!(platform.counter, Some(10));

        // Power cycle
        let mut security = manager();
        security.restore_counter(&mut platform);
        assert_eq!(security.next_frame_counter(&mut platform), Ok(10));
        assert_eq!(security.next_frame_counter(&mut platform), Ok(11));
    }

    #[test]
    fn counter_exhaustion() {
        let mut platform = MockPlatform {
            counter: Some(u32::MAX - 1),
            ..Default::default()
        };
        let mut security = manager();
        security.restore_counter(&mut platform);
        assert_eq!(
            security.next_frame_counter(&mut platform),
            Ok(u32::MAX - 1)
        );
        assert_eq!(
            security.next_frame_counter(&mut platform),
            Err(Error::CounterExhausted)
        );
        assert_eq!(
            security.next_frame_counter(&mut platform),
            Err(Error::CounterExhausted)
        );
        assert_eq!(platform.counter, Some(u32::MAX));
    }

    #[test]
    fn counter_not_advanced_on_storage_failure() {
        let mut platform = MockPlatform {
            fail_storage: true,
            ..Default::default()
        };
        let mut security = manager();
        assert_eq!(
            security.next_frame_counter(&mut platform),
            Err(Error::StorageError)
        );
        assert_eq!(security.frame_counter(), 0);
    }

    #[test]
    fn transported_key_is_bound_to_direction() {
        let mut security = manager();
        let address = GpdAddress::SourceId(0x1234_5678);
        let (encrypted, mic) = security.encrypt_key(&address, 3).unwrap();
        assert_eq!(
            security.decrypt_key(&address, 3, &encrypted, mic),
            Err(Error::AuthenticationFailed)
        );
    }
}
