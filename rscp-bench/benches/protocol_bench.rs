//! Codec encoding/decoding benchmarks.

use bytes::Bytes;
use chrono::DateTime;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rscp_protocol::{
    compute_checksum, tags, ContainerParser, DataElement, Frame, FrameDecoder, FrameParser,
    ParserOptions,
};

/// A battery/meter poll answer with `count` power meter containers.
fn create_test_frame(count: usize) -> Frame {
    let mut builder = Frame::builder()
        .timestamp(DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default())
        .element(DataElement::float32(tags::BAT_RSOC, 87.5))
        .element(DataElement::int32(tags::EMS_POWER_PV, 4_210));

    for index in 0..count {
        let meter = DataElement::container(
            tags::PM_DATA,
            &[
                DataElement::uchar8(tags::PM_INDEX, index as u8),
                DataElement::double64(tags::PM_POWER_L1, -812.75),
            ],
        )
        .unwrap();
        builder = builder.element(meter);
    }
    builder.build()
}

fn bench_element_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("element_encode");

    for size in [16, 1024, 65535] {
        let element = DataElement::bytearray(tags::WB_EXTERN_DATA, vec![0x42u8; size]);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &element, |b, element| {
            b.iter(|| black_box(element.encode().unwrap()));
        });
    }

    group.finish();
}

fn bench_container_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("container_parse");
    let parser = ContainerParser::default();

    for count in [1, 10, 100] {
        let encoded: Bytes = create_test_frame(count)
            .elements()
            .iter()
            .flat_map(|e| e.encode().unwrap())
            .collect();

        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &encoded, |b, encoded| {
            b.iter(|| black_box(parser.parse_bytes(encoded.clone()).unwrap()));
        });
    }

    group.finish();
}

fn bench_frame_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_encode");

    for count in [1, 10, 100] {
        let frame = create_test_frame(count);

        group.throughput(Throughput::Elements(frame.elements().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &frame, |b, frame| {
            b.iter(|| black_box(frame.encode().unwrap()));
        });
    }

    group.finish();
}

fn bench_frame_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_decode");
    let parser = FrameParser::with_options(ParserOptions {
        verify_checksum: true,
        ..Default::default()
    });

    for count in [1, 10, 100] {
        let encoded = create_test_frame(count).encode().unwrap().freeze();

        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &encoded, |b, encoded| {
            b.iter(|| black_box(parser.parse_bytes(encoded.clone()).unwrap()));
        });
    }

    group.finish();
}

fn bench_nested_lookup(c: &mut Criterion) {
    let frame = create_test_frame(100);

    c.bench_function("nested_lookup", |b| {
        b.iter(|| black_box(frame.double_by_tag(&tags::PM_POWER_L1, &[&tags::PM_DATA])));
    });
}

fn bench_stream_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream_decode");

    for frames in [1, 10, 100] {
        let encoded = create_test_frame(4).encode().unwrap();
        let stream: Vec<u8> = (0..frames).flat_map(|_| encoded.to_vec()).collect();

        group.throughput(Throughput::Elements(frames as u64));
        group.bench_with_input(BenchmarkId::from_parameter(frames), &stream, |b, stream| {
            b.iter(|| {
                let mut decoder = FrameDecoder::new();
                decoder.extend(stream);
                while let Some(frame) = decoder.decode_frame().unwrap() {
                    black_box(frame);
                }
            });
        });
    }

    group.finish();
}

fn bench_crc32(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc32");

    for size in [100, 1000, 10000, 65535] {
        let data = vec![0x42u8; size];

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| black_box(compute_checksum(data)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_element_encode,
    bench_container_parse,
    bench_frame_encode,
    bench_frame_decode,
    bench_nested_lookup,
    bench_stream_decode,
    bench_crc32,
);

criterion_main!(benches);
