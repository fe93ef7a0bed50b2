//! Static visual class registry
//!
//! Maps every class tag the builder can assign to a display label and icon
//! URL. Purely static and independent of cluster state; emitted once at the
//! top of every document.

pub struct ClassStyle {
    pub tag: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

/// Class registry rows, in emission order. Icons come from the Kubernetes
/// community icon set.
pub const CLASS_REGISTRY: &[ClassStyle] = &[
    ClassStyle {
        tag: "k8s-ns",
        label: "Namespace",
        icon: "https://raw.githubusercontent.com/kubernetes/community/master/icons/svg/resources/labeled/ns.svg",
    },
    ClassStyle {
        tag: "k8s-ingress",
        label: "Ingress",
        icon: "https://raw.githubusercontent.com/kubernetes/community/master/icons/svg/resources/labeled/ing.svg",
    },
    ClassStyle {
        tag: "k8s-svc",
        label: "Service",
        icon: "https://raw.githubusercontent.com/kubernetes/community/master/icons/svg/resources/labeled/svc.svg",
    },
    ClassStyle {
        tag: "k8s-deployment",
        label: "Deployment",
        icon: "https://raw.githubusercontent.com/kubernetes/community/master/icons/svg/resources/labeled/deploy.svg",
    },
    ClassStyle {
        tag: "k8s-statefulset",
        label: "StatefulSet",
        icon: "https://raw.githubusercontent.com/kubernetes/community/master/icons/svg/resources/labeled/sts.svg",
    },
    ClassStyle {
        tag: "k8s-daemonset",
        label: "DaemonSet",
        icon: "https://raw.githubusercontent.com/kubernetes/community/master/icons/svg/resources/labeled/ds.svg",
    },
    ClassStyle {
        tag: "k8s-configmap",
        label: "ConfigMap",
        icon: "https://raw.githubusercontent.com/kubernetes/community/master/icons/svg/resources/labeled/cm.svg",
    },
    ClassStyle {
        tag: "k8s-secret",
        label: "Secret",
        icon: "https://raw.githubusercontent.com/kubernetes/community/master/icons/svg/resources/labeled/secret.svg",
    },
    ClassStyle {
        tag: "k8s-hpa",
        label: "HPA",
        icon: "https://raw.githubusercontent.com/kubernetes/community/master/icons/svg/resources/labeled/hpa.svg",
    },
    ClassStyle {
        tag: "k8s-pdb",
        label: "PodDisruptionBudget",
        icon: "https://raw.githubusercontent.com/kubernetes/community/master/icons/svg/resources/labeled/pdb.svg",
    },
    ClassStyle {
        tag: "k8s-pvc",
        label: "PersistentVolumeClaim",
        icon: "https://raw.githubusercontent.com/kubernetes/community/master/icons/svg/resources/labeled/pvc.svg",
    },
];
