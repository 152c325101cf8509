use criterion::{criterion_group, criterion_main, Criterion};
use parlour_server::hub::Hub;
use parlour_server::metrics::ServerMetrics;
use parlour_server::protocol::Envelope;
use parlour_server::protocol::envelope::OutboundKind;
use std::hint::black_box;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use uuid::Uuid;

fn bench_hub_broadcast(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");

    c.bench_function("hub_broadcast_to_32_members", |b| {
        b.iter(|| {
            rt.block_on(async {
                let hub = Hub::spawn(ServerMetrics::new());
                let room = "BENCH1".to_string();
                let mut receivers = Vec::with_capacity(32);
                for _ in 0..32 {
                    let (tx, rx) = mpsc::channel(256);
                    hub.register(room.clone(), Uuid::new_v4(), tx).await;
                    receivers.push(rx);
                }

                let envelope = Envelope::outbound_empty(OutboundKind::Pong);
                hub.broadcast_to_room(room.clone(), envelope).await;

                for rx in &mut receivers {
                    black_box(rx.recv().await);
                }
            });
        });
    });

    c.bench_function("hub_register_and_unregister", |b| {
        b.iter(|| {
            rt.block_on(async {
                let hub = Hub::spawn(ServerMetrics::new());
                let room = "BENCH2".to_string();
                let player_id = Uuid::new_v4();
                let (tx, _rx) = mpsc::channel(256);
                hub.register(room.clone(), player_id, tx).await;
                hub.unregister(room, player_id).await;
            });
        });
    });
}

criterion_group!(hub_broadcast_throughput, bench_hub_broadcast);
criterion_main!(hub_broadcast_throughput);
