use crossdash_network::{build_network, Identity, Interaction, NetworkConfig};

fn person(name: &str) -> Identity {
    Identity::new(format!("id-{}", name.to_lowercase()), name)
}

#[test]
fn test_opposite_reads_yield_single_edge() {
    let interactions = vec![
        Interaction::new(person("Alice"), Some(person("Bob"))),
        Interaction::new(person("Bob"), Some(person("Alice"))),
    ];

    let network = build_network(&interactions, &NetworkConfig::default());

    assert_eq!(network.edges.len(), 1);
    let edge = &network.edges[0];
    assert_eq!((edge.source.as_str(), edge.target.as_str()), ("Alice", "Bob"));
    assert_eq!(edge.count, 2);
    assert_eq!(edge.weight, 1);
}

#[test]
fn test_clusters_and_sizes() {
    // Alice <-> Bob, Carol -> Dave, Carol -> Dave
    let interactions = vec![
        Interaction::new(person("Alice"), Some(person("Bob"))),
        Interaction::new(person("Carol"), Some(person("Dave"))),
        Interaction::new(person("Carol"), Some(person("Dave"))),
        Interaction::new(person("Erin"), None),
    ];

    let network = build_network(&interactions, &NetworkConfig::default());

    assert_eq!(network.node_count(), 5);
    let alice = network.node("Alice").unwrap();
    let bob = network.node("Bob").unwrap();
    let carol = network.node("Carol").unwrap();
    let erin = network.node("Erin").unwrap();

    assert_eq!(alice.id, "id-alice");
    assert_eq!(alice.cluster, bob.cluster);
    assert_ne!(alice.cluster, carol.cluster);
    assert_ne!(erin.cluster, carol.cluster);

    // Carol has the max weight (2)
    assert_eq!(carol.size, 30.0);
    assert_eq!(alice.size, 17.5);
    assert_eq!(bob.size, 5.0);

    // Carol/Dave was seen twice; undirected weight is corrected down by one
    assert_eq!(network.edge("Dave", "Carol").unwrap().weight, 1);
    assert_eq!(network.edge("Alice", "Bob").unwrap().weight, 0);
}

#[test]
fn test_single_node_uses_min_size() {
    let config = NetworkConfig { min_node_size: 2.0, max_node_size: 8.0, directional: false };
    let interactions = vec![
        Interaction::new(person("Alice"), None),
        Interaction::new(person("Alice"), None),
    ];

    let network = build_network(&interactions, &config);

    assert_eq!(network.node_count(), 1);
    assert_eq!(network.nodes[0].weight, 2);
    assert_eq!(network.nodes[0].size, 2.0);
}

#[test]
fn test_csr_view_matches_edges() {
    let config = NetworkConfig { directional: true, ..Default::default() };
    let interactions = vec![
        Interaction::new(person("Alice"), Some(person("Bob"))),
        Interaction::new(person("Alice"), Some(person("Carol"))),
        Interaction::new(person("Bob"), Some(person("Carol"))),
    ];

    let network = build_network(&interactions, &config);
    let view = network.view();

    assert_eq!(view.node_count, 3);
    assert_eq!(view.out_degree(0), 2);
    assert_eq!(view.in_degree(2), 2);
    assert_eq!(view.weights(0), &[1.0, 1.0]);
}
