//! Built-in result decorators.

pub mod encrypt;
pub mod encryptor;

pub use encrypt::{DecryptedCursor, EncryptDecorator, EncryptDecoratorProvider};
pub use encryptor::{Base64Encryptor, Encryptor};
