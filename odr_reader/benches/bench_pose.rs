//! # Pose Resolution Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use odr_reader::{Boundary, OdrReader};

const XODR: &str = r#"<OpenDRIVE>
    <header revMajor="1" revMinor="6"/>
    <road length="300.0" id="1" junction="-1">
        <planView>
            <geometry s="0.0" x="0.0" y="0.0" hdg="0.0" length="100.0">
                <line/>
            </geometry>
            <geometry s="100.0" x="100.0" y="0.0" hdg="0.0" length="100.0">
                <spiral curvStart="0.0" curvEnd="0.01"/>
            </geometry>
            <geometry s="200.0" x="198.34" y="16.62" hdg="0.5" length="100.0">
                <arc curvature="0.01"/>
            </geometry>
        </planView>
        <elevationProfile>
            <elevation s="0.0" a="0.0" b="0.02" c="0.0" d="0.0"/>
        </elevationProfile>
        <lateralProfile>
            <superelevation s="0.0" a="0.0" b="0.0005" c="0.0" d="0.0"/>
        </lateralProfile>
        <lanes>
            <laneSection s="0.0">
                <center>
                    <lane id="0" type="none"/>
                </center>
                <right>
                    <lane id="-1" type="driving">
                        <width sOffset="0.0" a="3.5" b="0.0" c="0.0" d="0.0"/>
                        <roadMark sOffset="0.0" type="broken" color="standard">
                            <type name="broken" width="0.12">
                                <line length="3.0" space="9.0" tOffset="0.0" sOffset="0.0"/>
                            </type>
                        </roadMark>
                    </lane>
                    <lane id="-2" type="driving">
                        <width sOffset="0.0" a="3.5" b="0.0" c="0.0" d="0.0"/>
                    </lane>
                </right>
            </laneSection>
        </lanes>
    </road>
</OpenDRIVE>"#;

fn pose_benchmark(c: &mut Criterion) {
    let reader = OdrReader::new(XODR).unwrap();

    c.bench_function("OdrReader::get_pose::line", |b| {
        b.iter(|| reader.get_pose("1", 50.0, -1.75).unwrap())
    });

    c.bench_function("OdrReader::get_pose::spiral", |b| {
        b.iter(|| reader.get_pose("1", 150.0, -1.75).unwrap())
    });

    c.bench_function("OdrReader::get_lane_boundary_pose", |b| {
        b.iter(|| {
            reader
                .get_lane_boundary_pose("1", -2, 250.0, Boundary::Outer)
                .unwrap()
        })
    });

    c.bench_function("OdrReader::get_lane_marking_points", |b| {
        b.iter(|| reader.get_lane_marking_points("1", 0.0, 300.0, 0.5, -1).unwrap())
    });
}

criterion_group!(benches, pose_benchmark);
criterion_main!(benches);
