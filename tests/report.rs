use container_bench_report::driver::{check_chart_backend, run};
use container_bench_report::{ImageFormat, ReportConfig};
use std::path::Path;

const CHARTS: [&str; 6] = [
    "startup_comparison",
    "memory_comparison",
    "cpu_comparison",
    "io_comparison",
    "scale_memory",
    "summary",
];

fn write_results(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    let files = [
        (
            "startup.csv",
            "runtime,value\nbare,2.1\nbare,2.5\ndocker,410\ndocker,395\npodman,520\n",
        ),
        (
            "memory.csv",
            "runtime,metric,value\n\
             docker,containers_1_overhead_mb,35\n\
             docker,containers_10_overhead_mb,180\n\
             docker,containers_10_total_mb,900\n\
             podman,containers_1_overhead_mb,12\n\
             podman,containers_10_overhead_mb,95\n",
        ),
        (
            "cpu.csv",
            "runtime,value\nbare,1.02\ndocker,1.05\npodman,1.07\npodman,inf\n",
        ),
        (
            "io.csv",
            "runtime,mode,mb_per_sec\n\
             bare,direct,910\n\
             docker,overlay,640\n\
             docker,volume,870\n\
             podman,overlay,600\n\
             podman,volume,850\n",
        ),
        (
            "scale.csv",
            "runtime,count,memory_mb,time_seconds\n\
             docker,1,40,0.6\n\
             docker,5,150,2.9\n\
             docker,10,290,6.1\n\
             podman,1,15,0.8\n\
             podman,5,70,3.5\n\
             podman,10,130,7.2\n",
        ),
    ];
    for (name, contents) in files {
        std::fs::write(dir.join(name), contents).unwrap();
    }
}

fn config(root: &Path) -> ReportConfig {
    ReportConfig {
        results_dir: root.join("results"),
        images_dir: Some(root.join("site/images")),
        format: ImageFormat::Svg,
    }
}

#[test]
fn test_full_report_writes_every_chart_to_both_targets() {
    if check_chart_backend().is_err() {
        eprintln!("no sans-serif font, skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    write_results(&config.results_dir);

    let summary = run(&config).unwrap();
    assert!(summary.failed.is_empty(), "failed: {:?}", summary.failed);
    assert!(summary.skipped.is_empty(), "skipped: {:?}", summary.skipped);
    assert_eq!(summary.written.len(), 12);

    for stem in CHARTS {
        for target in [&config.results_dir, config.images_dir.as_ref().unwrap()] {
            let path = target.join(format!("{}.svg", stem));
            assert!(path.is_file(), "missing {}", path.display());
        }
    }
}

#[test]
fn test_report_is_reproducible() {
    if check_chart_backend().is_err() {
        eprintln!("no sans-serif font, skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    write_results(&config.results_dir);

    let first = run(&config).unwrap();
    let before: Vec<Vec<u8>> = first
        .written
        .iter()
        .map(|p| std::fs::read(p).unwrap())
        .collect();

    let second = run(&config).unwrap();
    assert_eq!(first.written, second.written);
    for (path, bytes) in second.written.iter().zip(&before) {
        assert_eq!(&std::fs::read(path).unwrap(), bytes, "{} changed", path.display());
    }
}
