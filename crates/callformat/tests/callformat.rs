use paratime_callformat::{
    decode_result, encode_call, encode_call_with_rng,
    mrae::{self, BoxKey},
    Error, Metadata,
};
use paratime_types::{
    callformat::{
        CallDataPublicKey, CallEnvelopeX25519DeoxysII, ResultEnvelopeX25519DeoxysII,
        SignedPublicKey,
    },
    Call, CallFormat, CallResult, Value,
};
use rand::{rngs::StdRng, SeedableRng};
use x25519_dalek::{PublicKey, StaticSecret};

const RUNTIME_SECRET: [u8; 32] = [7; 32];

fn runtime_key(epoch: u64) -> CallDataPublicKey {
    let pk = PublicKey::from(&StaticSecret::from(RUNTIME_SECRET));
    CallDataPublicKey {
        public_key: SignedPublicKey {
            key: pk.to_bytes(),
            ..Default::default()
        },
        epoch,
    }
}

fn plain_call() -> Call {
    Call {
        format: CallFormat::Plain,
        method: "contracts.Call".into(),
        body: Value::Map(vec![(Value::Text("data".into()), Value::Bytes(vec![1, 2, 3]))]),
        read_only: false,
    }
}

/// The runtime's side: open the call, returning it and the box key.
fn open_call(call: &Call) -> (Call, BoxKey) {
    assert_eq!(call.format, CallFormat::EncryptedX25519DeoxysII);
    let envelope: CallEnvelopeX25519DeoxysII =
        paratime_hash::from_value(call.body.clone()).unwrap();
    let key = mrae::derive_symmetric(&envelope.pk, &RUNTIME_SECRET);
    let plain = key.open(&envelope.nonce, &envelope.data, &[]).unwrap();
    (paratime_hash::deserialize(&plain).unwrap(), key)
}

/// The runtime's side: seal a result for the caller.
fn seal_result(key: &BoxKey, result: &CallResult) -> CallResult {
    let nonce = [9u8; mrae::NONCE_SIZE];
    let data = key.seal(&nonce, &paratime_hash::serialize(result), &[]);
    CallResult::Unknown(paratime_hash::to_value(&ResultEnvelopeX25519DeoxysII {
        nonce,
        data,
    }))
}

#[test]
fn derive_symmetric_golden() {
    let public = hex::decode("3046db3fa70ce605457dc47c48837ebd8bd0a26abfde5994d033e1ced68e2576")
        .unwrap()
        .try_into()
        .unwrap();
    let private = hex::decode("c07b151fbc1e7a11dff926111188f8d872f62eba0396da97c0a24adb75161750")
        .unwrap()
        .try_into()
        .unwrap();
    let key = mrae::derive_symmetric(&public, &private);
    assert_eq!(
        hex::encode(key.as_bytes()),
        "e69ac21066a8c2284e8fdc690e579af4513547b9b31dd144792c1904b45cf586"
    );
}

#[test]
fn box_roundtrip() {
    let key = BoxKey::from_bytes([3; mrae::KEY_SIZE]);
    let nonce = b"0123456789abcde";
    let sealed = key.seal(nonce, b"a message to mangle", b"additional data");
    assert_eq!(
        key.open(nonce, &sealed, b"additional data").unwrap(),
        b"a message to mangle"
    );
    assert!(key.open(nonce, &sealed, b"other data").is_err());

    let alice = StaticSecret::from([1; 32]);
    let bob = StaticSecret::from([2; 32]);
    let sealed = mrae::box_seal(
        nonce,
        b"hi",
        &[],
        PublicKey::from(&bob).as_bytes(),
        &alice.to_bytes(),
    );
    let opened = mrae::box_open(
        nonce,
        &sealed,
        &[],
        PublicKey::from(&alice).as_bytes(),
        &bob.to_bytes(),
    )
    .unwrap();
    assert_eq!(opened, b"hi");
}

#[test]
fn plain_passthrough() {
    let (call, meta) = encode_call(plain_call(), CallFormat::Plain, None).unwrap();
    assert_eq!(call, plain_call());
    assert!(matches!(meta, Metadata::Plain));

    let result = CallResult::Ok(Value::Integer(1.into()));
    assert_eq!(decode_result(result.clone(), &meta).unwrap(), result);
    let unknown = CallResult::Unknown(Value::Null);
    assert_eq!(decode_result(unknown.clone(), &meta).unwrap(), unknown);
}

#[test]
fn encrypted_roundtrip() {
    let _ = tracing_subscriber::fmt::try_init();
    let mut rng = StdRng::seed_from_u64(1);
    let mut original = plain_call();
    original.read_only = true;

    let (call, meta) = encode_call_with_rng(
        original.clone(),
        CallFormat::EncryptedX25519DeoxysII,
        Some(&runtime_key(42)),
        &mut rng,
    )
    .unwrap();
    assert_eq!(meta.format(), CallFormat::EncryptedX25519DeoxysII);
    assert!(call.method.is_empty());
    assert!(call.read_only);

    let envelope: CallEnvelopeX25519DeoxysII =
        paratime_hash::from_value(call.body.clone()).unwrap();
    assert_eq!(envelope.epoch, 42);

    let (inner, key) = open_call(&call);
    assert_eq!(inner, original);

    let ok = CallResult::Ok(Value::Text("done".into()));
    assert_eq!(decode_result(seal_result(&key, &ok), &meta).unwrap(), ok);

    let failed = CallResult::Failed {
        module: "contracts".into(),
        code: 5,
        message: "out of gas".into(),
    };
    assert_eq!(decode_result(seal_result(&key, &failed), &meta).unwrap(), failed);
}

#[test]
fn fresh_key_and_nonce_per_call() {
    let (a, _) = encode_call(
        plain_call(),
        CallFormat::EncryptedX25519DeoxysII,
        Some(&runtime_key(1)),
    )
    .unwrap();
    let (b, _) = encode_call(
        plain_call(),
        CallFormat::EncryptedX25519DeoxysII,
        Some(&runtime_key(1)),
    )
    .unwrap();
    let a: CallEnvelopeX25519DeoxysII = paratime_hash::from_value(a.body).unwrap();
    let b: CallEnvelopeX25519DeoxysII = paratime_hash::from_value(b.body).unwrap();
    assert_ne!(a.pk, b.pk);
    assert_ne!(a.nonce, b.nonce);
    assert_ne!(a.data, b.data);
}

#[test]
fn tampered_result_is_fatal() {
    let (call, meta) = encode_call(
        plain_call(),
        CallFormat::EncryptedX25519DeoxysII,
        Some(&runtime_key(1)),
    )
    .unwrap();
    let (_, key) = open_call(&call);
    let CallResult::Unknown(raw) = seal_result(&key, &CallResult::Ok(Value::Null)) else {
        unreachable!()
    };
    let mut envelope: ResultEnvelopeX25519DeoxysII = paratime_hash::from_value(raw).unwrap();
    envelope.data[0] ^= 0xff;
    let tampered = CallResult::Unknown(paratime_hash::to_value(&envelope));
    assert!(matches!(
        decode_result(tampered, &meta),
        Err(Error::Authentication(_))
    ));

    // A result sealed under another call's key fails the same way.
    let (other, _) = encode_call(
        plain_call(),
        CallFormat::EncryptedX25519DeoxysII,
        Some(&runtime_key(1)),
    )
    .unwrap();
    let (_, other_key) = open_call(&other);
    assert!(matches!(
        decode_result(seal_result(&other_key, &CallResult::Ok(Value::Null)), &meta),
        Err(Error::Authentication(_))
    ));
}

#[test]
fn unexpected_results() {
    let (call, meta) = encode_call(
        plain_call(),
        CallFormat::EncryptedX25519DeoxysII,
        Some(&runtime_key(1)),
    )
    .unwrap();

    // A plain success for an encrypted call is rejected.
    assert!(matches!(
        decode_result(CallResult::Ok(Value::Null), &meta),
        Err(Error::UnexpectedPlainResult)
    ));

    // A failure before format processing is surfaced unchanged.
    let failed = CallResult::Failed {
        module: "core".into(),
        code: 15,
        message: String::new(),
    };
    assert_eq!(decode_result(failed.clone(), &meta).unwrap(), failed);

    // An envelope that is not an envelope.
    assert!(matches!(
        decode_result(CallResult::Unknown(Value::Text("x".into())), &meta),
        Err(Error::MalformedEnvelope(_))
    ));

    // An opened result that is itself unknown.
    let (_, key) = open_call(&call);
    let nested = seal_result(&key, &CallResult::Unknown(Value::Null));
    assert!(matches!(
        decode_result(nested, &meta),
        Err(Error::UnexpectedUnknownResult)
    ));
}

#[test]
fn missing_public_key() {
    assert!(matches!(
        encode_call(plain_call(), CallFormat::EncryptedX25519DeoxysII, None),
        Err(Error::MissingPublicKey)
    ));
}
