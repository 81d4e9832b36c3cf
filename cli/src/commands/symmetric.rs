//! Symmetric encryption commands.

use medichain_core::crypto::{decrypt_symmetric, encrypt_symmetric, open_symmetric, seal_symmetric};
use medichain_core::SymmetricKeyMaterial;

use crate::io::{print_json, read_input, read_payload};
use crate::{InputArgs, SymmetricArgs};

fn material(args: &SymmetricArgs) -> anyhow::Result<SymmetricKeyMaterial> {
    Ok(SymmetricKeyMaterial::from_hex(&args.key, &args.iv)?)
}

pub fn sym_encrypt(key: &SymmetricArgs, input: &InputArgs) -> anyhow::Result<()> {
    let ciphertext = encrypt_symmetric(&read_payload(input)?, &material(key)?)?;
    println!("{}", ciphertext);
    Ok(())
}

pub fn sym_decrypt(key: &SymmetricArgs, input: &InputArgs) -> anyhow::Result<()> {
    print_json(&decrypt_symmetric(&read_input(input)?, &material(key)?)?)
}

pub fn seal(key: &SymmetricArgs, input: &InputArgs) -> anyhow::Result<()> {
    let sealed = seal_symmetric(&read_payload(input)?, &material(key)?)?;
    println!("{}", sealed);
    Ok(())
}

pub fn open(key: &SymmetricArgs, input: &InputArgs) -> anyhow::Result<()> {
    print_json(&open_symmetric(&read_input(input)?, &material(key)?)?)
}
