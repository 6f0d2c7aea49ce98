use std::env;

use javelin_class_graph::Collector;
use javelin_class_path::ClassPath;

fn main() {
    pretty_env_logger::init();

    let path_list = env::var_os("CLASSPATH").unwrap_or_default();
    let root = env::args()
        .nth(1)
        .or_else(|| env::var("ROOT_CLASS").ok())
        .unwrap();

    let class_path = ClassPath::from_path_list(path_list).unwrap();
    if class_path.is_empty() {
        log::warn!("CLASSPATH is empty, nothing can be resolved");
    }

    let graph = Collector::new(class_path).collect(&root).unwrap();

    print!("{}", graph);
    println!();
    println!(
        "{} classes ({} failed), {} references",
        graph.len(),
        graph.failed().count(),
        graph.edge_count()
    );
}
