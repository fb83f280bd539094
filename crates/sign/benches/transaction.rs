use criterion::{criterion_group, criterion_main, Criterion};
use paratime_sign::{
    context::{self, ChainContext},
    transaction::{verify_transaction, TransactionSigner},
    Ed25519Signer, Secp256k1Signer, Signer,
};
use paratime_types::{multisig, Transaction, Value};
use rand::{rngs::StdRng, SeedableRng};

pub fn bench(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let ctx = context::tx_context(&ChainContext::new("bench chain"));
    for n in [1, 4, 16] {
        let signers: Vec<Box<dyn Signer>> = (0..n)
            .map(|i| -> Box<dyn Signer> {
                if i % 2 == 0 {
                    Box::new(Ed25519Signer::generate(&mut rng))
                } else {
                    Box::new(Secp256k1Signer::generate(&mut rng))
                }
            })
            .collect();
        let config = multisig::Config {
            signers: signers
                .iter()
                .map(|s| multisig::Signer {
                    public_key: s.public_key(),
                    weight: 1,
                })
                .collect(),
            threshold: n,
        };
        let mut tx = Transaction::new("accounts.Transfer", Value::Bytes(vec![0; 256]));
        tx.append_auth_multisig(config, 0);

        c.bench_function(&format!("sign_multisig_{n}"), |b| {
            b.iter(|| {
                let mut signer = TransactionSigner::new(tx.clone(), ctx.clone());
                for s in &signers {
                    signer.append_sign(s).unwrap();
                }
                signer.finalize().unwrap()
            })
        });

        let mut signer = TransactionSigner::new(tx.clone(), ctx.clone());
        for s in &signers {
            signer.append_sign(s).unwrap();
        }
        let utx = signer.finalize().unwrap();
        c.bench_function(&format!("verify_multisig_{n}"), |b| {
            b.iter(|| verify_transaction(&utx, &ctx).unwrap())
        });
    }
}

criterion_group!(benches, bench);
criterion_main!(benches);
