pub mod variation_graph;
