use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rtstream_protocol::feedback::FeedbackReport;
use rtstream_protocol::packet::{MediaPacket, PacketHeader, MJPEG_PAYLOAD_TYPE};
use rtstream_protocol::sequence::SeqNumber;

fn bench_media_packet_encode(c: &mut Criterion) {
    let header = PacketHeader::new(MJPEG_PAYLOAD_TYPE, SeqNumber::new(1000), 5000, 9999);
    let payload = Bytes::from(vec![0u8; 1400]); // Typical frame slice size
    let packet = MediaPacket::new(header, payload);

    c.bench_function("media_packet_encode", |b| {
        b.iter(|| {
            let bytes = black_box(&packet).to_bytes();
            black_box(bytes);
        });
    });
}

fn bench_media_packet_decode(c: &mut Criterion) {
    let header = PacketHeader::new(MJPEG_PAYLOAD_TYPE, SeqNumber::new(1000), 5000, 9999);
    let payload = Bytes::from(vec![0u8; 1400]);
    let bytes = MediaPacket::new(header, payload).to_bytes();

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("media_packet_decode", |b| {
        b.iter(|| {
            let packet = MediaPacket::from_bytes(black_box(&bytes)).unwrap();
            black_box(packet);
        });
    });
    group.finish();
}

fn bench_feedback_roundtrip(c: &mut Criterion) {
    let report = FeedbackReport {
        fraction_lost: 0.05,
        cumulative_lost: 123,
        highest_seq: 45678,
    };

    c.bench_function("feedback_roundtrip", |b| {
        b.iter(|| {
            let bytes = black_box(&report).to_bytes();
            let decoded = FeedbackReport::from_bytes(&bytes).unwrap();
            black_box(decoded);
        });
    });
}

criterion_group!(
    benches,
    bench_media_packet_encode,
    bench_media_packet_decode,
    bench_feedback_roundtrip
);
criterion_main!(benches);
