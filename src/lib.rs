#![cfg_attr(not(feature = "std"), no_std)]

//! Bulk byte-buffer XOR for keystream and padding-mask operations.
//!
//! ```
//! let mut out = [0u8; 2];
//! let n = bulkxor::xor_bytes(&mut out, &[0x0F, 0xF0], &[0xFF, 0x00]).unwrap();
//! assert_eq!(n, 2);
//! assert_eq!(out, [0xF0, 0xF0]);
//! ```

#[cfg(all(not(feature = "std"), not(test)))]
use core::panic::PanicInfo;

#[cfg(all(not(feature = "std"), not(test)))]
#[panic_handler]
fn panic(_info: &PanicInfo) -> ! { loop {} }

pub mod config;
pub mod engine;
pub mod ffi;
pub mod platform;

pub use config::XorConfig;
pub use engine::{xor_bytes, xor_in_place, xor_words, Strategy, XorEngine, XorError, WORD_SIZE};
pub use platform::Caps;

#[no_mangle]
pub extern "C" fn bulkxor_version() -> u32 {
    0x000100
}
