use paratime_sign::{
    context::{self, ChainContext},
    verify, Ed25519Signer, Error, Secp256k1Signer, Signer, Sr25519Signer,
};
use paratime_types::{PublicKey, Signature};
use prop::test_runner::FileFailurePersistence;
use proptest::{prelude::*, test_runner::Config};
use rand::{rngs::StdRng, SeedableRng};

fn chain_context() -> ChainContext {
    let mut runtime_id = [0u8; 32];
    runtime_id[0] = 0x80;
    ChainContext::derive(
        &runtime_id,
        "643fb06848be7e970af3b5b2d772eb8cfb30499c8162bc18ac03df2f5e22520e",
    )
}

fn signers() -> Vec<Box<dyn Signer>> {
    let mut rng = StdRng::seed_from_u64(0xcd);
    vec![
        Box::new(Ed25519Signer::generate(&mut rng)),
        Box::new(Secp256k1Signer::generate(&mut rng)),
        Box::new(Sr25519Signer::generate(&mut rng)),
    ]
}

#[test]
fn derive_chain_context() {
    assert_eq!(
        chain_context().as_str(),
        "ca4842870b97a6d5c0d025adce0b6a0dec94d2ba192ede70f96349cfbe3628b9"
    );
}

#[test]
fn tx_context() {
    let ctx = context::tx_context(&chain_context());
    assert_eq!(
        std::str::from_utf8(&ctx).unwrap(),
        "oasis-runtime-sdk/tx: v0 for chain ca4842870b97a6d5c0d025adce0b6a0dec94d2ba192ede70f96349cfbe3628b9"
    );
    let consensus = context::combine(
        context::CONSENSUS_TX_SIGNATURE_CONTEXT,
        &ChainContext::new("abc"),
    );
    assert_eq!(consensus, b"oasis-core/consensus: tx for chain abc");
}

#[test]
fn ed25519_golden() {
    let signer = Ed25519Signer::from_seed(&[0x42; 32]);
    assert_eq!(
        signer.public_key(),
        PublicKey::Ed25519(
            hex::decode("2152f8d19b791d24453242e15f2eab6cb7cffa7b6a5ed30097960e069881db12")
                .unwrap()
                .try_into()
                .unwrap()
        )
    );
    let sig = signer
        .sign(&context::tx_context(&chain_context()), b"hello")
        .unwrap();
    let expected_signature_hex = concat!(
        "6ba5cc17f361fcf39b05eb06c4754e70a4b8c6c21ca1f9e56b7ce548055f8b4e",
        "6d1280d29f666c3a3a31186e1a19a2172349a55ea70ac30b1ed27670b155e70c"
    );
    assert_eq!(hex::encode(&sig.0), expected_signature_hex);
}

#[test]
fn secp256k1_golden() {
    let signer = Secp256k1Signer::from_seed(&[0x11; 32]).unwrap();
    let PublicKey::Secp256k1(pk) = signer.public_key() else {
        panic!("expected a secp256k1 key");
    };
    assert_eq!(
        hex::encode(pk),
        "034f355bdcb7cc0af728ef3cceb9615d90684bb5b2ca5f859ab0f0b704075871aa"
    );
    let sig = signer
        .sign(&context::tx_context(&chain_context()), b"hello")
        .unwrap();
    let expected_signature_hex = concat!(
        "3045022100d09d79c3522aba064b3d1e5a14b81f71ae41da62d7de34dcac84bc48de58fe68",
        "02204807894ca75d372b09d1fa8ec8a70718c773c7aff504dd9c4b231170f2f5bdb5"
    );
    assert_eq!(hex::encode(&sig.0), expected_signature_hex);
}

#[test]
fn sign_and_verify() {
    let _ = tracing_subscriber::fmt::try_init();
    let ctx = context::tx_context(&chain_context());
    for signer in signers() {
        let pk = signer.public_key();
        let sig = signer.sign(&ctx, b"message").unwrap();
        verify(&pk, &ctx, b"message", &sig).unwrap();
    }
}

#[test]
fn tampered_message_fails() {
    let ctx = context::tx_context(&chain_context());
    for signer in signers() {
        let pk = signer.public_key();
        let sig = signer.sign(&ctx, b"message").unwrap();
        assert!(matches!(
            verify(&pk, &ctx, b"massage", &sig),
            Err(Error::VerificationFailed)
        ));
    }
}

#[test]
fn other_chain_fails() {
    let ctx = context::tx_context(&chain_context());
    let other = context::tx_context(&ChainContext::new("00"));
    for signer in signers() {
        let pk = signer.public_key();
        let sig = signer.sign(&ctx, b"message").unwrap();
        assert!(verify(&pk, &other, b"message", &sig).is_err());
    }
}

#[test]
fn tampered_signature_fails() {
    let ctx = b"test context";
    for signer in signers() {
        let pk = signer.public_key();
        let mut sig = signer.sign(ctx, b"message").unwrap();
        let last = sig.0.len() - 1;
        sig.0[last] ^= 0x01;
        assert!(verify(&pk, ctx, b"message", &sig).is_err());
    }
}

#[test]
fn wrong_key_fails() {
    let ctx = b"test context";
    let mut rng = StdRng::seed_from_u64(1);
    let a = Ed25519Signer::generate(&mut rng);
    let b = Ed25519Signer::generate(&mut rng);
    let sig = a.sign(ctx, b"message").unwrap();
    assert!(matches!(
        verify(&b.public_key(), ctx, b"message", &sig),
        Err(Error::VerificationFailed)
    ));
}

#[test]
fn malformed_signature() {
    let signer = Secp256k1Signer::from_seed(&[0x11; 32]).unwrap();
    assert!(matches!(
        verify(&signer.public_key(), b"ctx", b"m", &Signature(vec![1, 2, 3])),
        Err(Error::MalformedSignature("secp256k1"))
    ));
    let signer = Ed25519Signer::from_seed(&[0x42; 32]);
    assert!(matches!(
        verify(&signer.public_key(), b"ctx", b"m", &Signature(vec![0; 63])),
        Err(Error::MalformedSignature("ed25519"))
    ));
}

#[test]
fn malformed_secret_key() {
    assert!(matches!(
        Secp256k1Signer::from_seed(&[0; 32]),
        Err(Error::MalformedSecretKey("secp256k1"))
    ));
}

#[test]
fn raw_signing() {
    let mut rng = StdRng::seed_from_u64(7);
    let sr = Sr25519Signer::generate(&mut rng);
    assert!(matches!(
        sr.sign_raw(&[0; 32]),
        Err(Error::UnsupportedRawSigning(_))
    ));

    let secp = Secp256k1Signer::generate(&mut rng);
    assert!(matches!(
        secp.sign_raw(b"not a digest"),
        Err(Error::UnsupportedRawSigning(_))
    ));
    let sig = secp.sign_raw(&[7; 32]).unwrap();
    assert_eq!(sig.0.len(), 65);
    assert!(sig.0[64] <= 3);
}

proptest! {
    #![proptest_config(Config::with_failure_persistence(FileFailurePersistence::WithSource("regressions")))]

    #[test]
    fn signatures_bind_message(seed in any::<u64>(), message in prop::collection::vec(any::<u8>(), 0..256), flip in any::<usize>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let ctx = context::tx_context(&chain_context());
        let signer = Ed25519Signer::generate(&mut rng);
        let pk = signer.public_key();
        let sig = signer.sign(&ctx, &message).unwrap();
        prop_assert!(verify(&pk, &ctx, &message, &sig).is_ok());

        let mut tampered = message.clone();
        if tampered.is_empty() {
            tampered.push(0);
        } else {
            let i = flip % tampered.len();
            tampered[i] ^= 1;
        }
        prop_assert!(verify(&pk, &ctx, &tampered, &sig).is_err());
    }
}
